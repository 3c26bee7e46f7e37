use base64::Engine;
use clap::{Parser, Subcommand};
use kedai_core::{NewRegistration, RegistrationService};
use kedai_rules::{
    format_whatsapp_display, normalize_whatsapp, resolve_asset_url, resolve_certificate_url,
    split_structured_description, to_local_whatsapp, wa_link,
};

#[derive(Parser)]
#[command(name = "kedai")]
#[command(about = "Kedai CMS operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalise a WhatsApp number to canonical 62… form
    Normalize {
        /// Raw number in any input format
        number: String,
    },
    /// Show every derived form of a WhatsApp number
    Number {
        /// Raw number in any input format
        number: String,
    },
    /// Resolve a stored asset reference to a fetchable URL
    Resolve {
        /// Stored reference (filename, path, URL, data URI, JSON-wrapped)
        reference: String,
        /// Resolve into the certificates folder instead of payment proofs
        #[arg(long)]
        certificate: bool,
    },
    /// Encode a local file as an inline data URI
    Encode {
        /// Path to the file to encode
        file: std::path::PathBuf,
    },
    /// Parse a class description into intro, heading and materials
    Parse {
        /// Description text
        text: String,
    },
    /// List all registrations
    List,
    /// Create a registration
    Register {
        /// Participant name
        name: String,
        /// Contact WhatsApp number, any input format
        whatsapp: String,
        /// Class name
        class_name: String,
        /// Class description (optional)
        #[arg(long, default_value = "")]
        description: String,
        /// Payment proof reference (optional)
        #[arg(long)]
        payment_proof: Option<String>,
        /// Certificate reference (optional)
        #[arg(long)]
        certificate: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Normalize { number }) => {
            println!("{}", normalize_whatsapp(&number));
        }
        Some(Commands::Number { number }) => {
            println!("canonical: {}", normalize_whatsapp(&number));
            println!("display:   {}", format_whatsapp_display(&number));
            println!("local:     {}", to_local_whatsapp(&number));
            match wa_link(&number) {
                Some(link) => println!("link:      {link}"),
                None => println!("link:      (no digits)"),
            }
        }
        Some(Commands::Resolve {
            reference,
            certificate,
        }) => {
            let resolved = if certificate {
                resolve_certificate_url(&reference)
            } else {
                resolve_asset_url(&reference)
            };
            println!("{resolved}");
        }
        Some(Commands::Encode { file }) => {
            let bytes = std::fs::read(&file)?;
            let mime = infer::get(&bytes)
                .map(|kind| kind.mime_type())
                .unwrap_or("application/octet-stream");
            let payload = base64::engine::general_purpose::STANDARD.encode(&bytes);
            println!("data:{mime};base64,{payload}");
        }
        Some(Commands::Parse { text }) => {
            let parsed = split_structured_description(&text);
            if !parsed.intro.is_empty() {
                println!("{}", parsed.intro);
            }
            if let Some(heading) = parsed.heading {
                println!("{heading}");
            }
            for item in parsed.items {
                println!("  - {item}");
            }
        }
        Some(Commands::List) => {
            let service = RegistrationService::new();
            let rows = service.list_rows();
            if rows.is_empty() {
                println!("No registrations found.");
            } else {
                for row in rows {
                    println!(
                        "ID: {}, Name: {}, WhatsApp: {}, Class: {}, Created: {}",
                        row.id, row.participant_name, row.whatsapp_display, row.class_name,
                        row.created_at
                    );
                }
            }
        }
        Some(Commands::Register {
            name,
            whatsapp,
            class_name,
            description,
            payment_proof,
            certificate,
        }) => {
            let service = RegistrationService::new();
            let registration = service.create(NewRegistration {
                participant_name: name,
                contact_whatsapp: whatsapp,
                class_name,
                description,
                payment_proof,
                certificate,
            })?;
            println!("Created registration {}", registration.id);
        }
        None => {
            println!("Use --help to see available commands.");
        }
    }

    Ok(())
}
