use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use openai_embedded::models::{AudioInputFormat, Config, ImageResponseFormat, ImageSize};
use openai_embedded::{ApiResponse, OpenAi};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "openai-embedded")]
#[command(about = "Call the OpenAI API from the command line")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Embed a text and print the vector.
    Embed {
        input: String,
        #[arg(long, default_value = "text-embedding-ada-002")]
        model: String,
    },
    /// Check a text against the content policy.
    Moderate { input: String },
    /// Complete a prompt.
    Complete {
        prompt: String,
        #[arg(long)]
        max_tokens: Option<u32>,
        #[arg(long)]
        temperature: Option<f32>,
    },
    /// Send one or more chat turns, keeping the conversation between them.
    Chat {
        #[arg(required = true)]
        messages: Vec<String>,
        #[arg(long)]
        system: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Edit a text following an instruction.
    Edit {
        input: String,
        #[arg(long)]
        instruction: String,
    },
    /// Generate images; with --out they are saved as PNG files.
    Image {
        prompt: String,
        #[arg(long, value_parser = parse_size_arg)]
        size: Option<ImageSize>,
        #[arg(long, default_value_t = 1)]
        n: u32,
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Transcribe an audio file.
    Transcribe {
        file: PathBuf,
        #[arg(long)]
        language: Option<String>,
    },
    /// Translate an audio file into English.
    Translate { file: PathBuf },
}

fn parse_size_arg(input: &str) -> std::result::Result<ImageSize, String> {
    match input {
        "256" | "256x256" => Ok(ImageSize::S256x256),
        "512" | "512x512" => Ok(ImageSize::S512x512),
        "1024" | "1024x1024" => Ok(ImageSize::S1024x1024),
        _ => Err(format!(
            "Invalid size '{}'. Expected 256x256, 512x512 or 1024x1024",
            input
        )),
    }
}

fn audio_format(path: &Path) -> Result<AudioInputFormat> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .with_context(|| format!("{} has no file extension", path.display()))?;
    Ok(extension.parse()?)
}

fn check<R: ApiResponse>(response: &R) -> Result<()> {
    if let Some(message) = response.error() {
        bail!("OpenAI API error: {}", message);
    }
    Ok(())
}

fn run(openai: &OpenAi, command: Command) -> Result<()> {
    match command {
        Command::Embed { input, model } => {
            let response = openai.embedding_create(&input, &model, None)?;
            check(&response)?;
            for embedding in response.iter() {
                println!("{:?}", embedding.as_slice());
            }
            if let Some(usage) = response.usage() {
                info!("Used {} tokens", usage);
            }
        }
        Command::Moderate { input } => {
            let response = openai.moderation_create(&input, None)?;
            check(&response)?;
            println!("flagged: {}", response.any_flagged());
        }
        Command::Complete {
            prompt,
            max_tokens,
            temperature,
        } => {
            let mut completion = openai.completion_create()?;
            if let Some(max_tokens) = max_tokens {
                completion.set_max_tokens(max_tokens);
            }
            if let Some(temperature) = temperature {
                completion.set_temperature(temperature);
            }
            let response = completion.prompt(&prompt)?;
            check(&response)?;
            for text in response.iter() {
                println!("{}", text);
            }
        }
        Command::Chat {
            messages,
            system,
            model,
        } => {
            let mut chat = openai.chat_create()?;
            if let Some(system) = system {
                chat.set_system(system);
            }
            if let Some(model) = model {
                chat.set_model(model);
            }
            for message in &messages {
                let response = chat.message(message, true)?;
                check(&response)?;
                println!("> {}\n{}", message, response.text(0).unwrap_or_default());
            }
            info!("Conversation has {} entries", chat.conversation().len());
        }
        Command::Edit { input, instruction } => {
            let edit = openai.edit_create()?;
            let response = edit.process(&instruction, &input)?;
            check(&response)?;
            for text in response.iter() {
                println!("{}", text);
            }
        }
        Command::Image {
            prompt,
            size,
            n,
            out,
        } => {
            let mut generation = openai.image_generation_create()?;
            generation.set_n(n);
            if let Some(size) = size {
                generation.set_size(size);
            }
            if out.is_some() {
                generation.set_response_format(ImageResponseFormat::B64Json);
            }
            let response = generation.prompt(&prompt)?;
            check(&response)?;
            match out {
                Some(dir) => {
                    std::fs::create_dir_all(&dir)?;
                    for index in 0..response.len() {
                        let path = dir.join(format!("image-{}.png", index));
                        std::fs::write(&path, response.decode(index)?)
                            .with_context(|| format!("writing {}", path.display()))?;
                        println!("{}", path.display());
                    }
                }
                None => {
                    for url in response.iter() {
                        println!("{}", url);
                    }
                }
            }
        }
        Command::Transcribe { file, language } => {
            let data = std::fs::read(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let mut transcription = openai.audio_transcription_create()?;
            if let Some(language) = language {
                transcription.set_language(language);
            }
            println!("{}", transcription.file(&data, audio_format(&file)?)?);
        }
        Command::Translate { file } => {
            let data = std::fs::read(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let translation = openai.audio_translation_create()?;
            println!("{}", translation.file(&data, audio_format(&file)?)?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "openai_embedded=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let openai = match Config::from_env().and_then(|config| OpenAi::from_config(&config)) {
        Ok(openai) => openai,
        Err(e) => {
            error!("Failed to initialize client: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&openai, args.command) {
        error!("Request failed: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
