//! Outil CLI pour chiffrer/déchiffrer les identifiants du cache distant
//!
//! Usage:
//!   cargo run --example encrypt_password -- encrypt "mon_mot_de_passe"
//!   cargo run --example encrypt_password -- decrypt "encrypted:ABC123..."

use anyhow::Result;
use sbconfig::encryption::{decrypt_password, encrypt_password, is_encrypted};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        print_usage();
        return Ok(());
    }

    match args[1].as_str() {
        "encrypt" => {
            let password = &args[2];
            let encrypted = encrypt_password(password)?;

            println!("Original:  {}", password);
            println!("Encrypted: {}", encrypted);
            println!("\nAdd this to your config.yaml under site.cache:");
            println!("password: \"{}\"", encrypted);
        }

        "decrypt" => {
            let encrypted = &args[2];

            if !is_encrypted(encrypted) {
                eprintln!("Error: Value does not start with 'encrypted:'");
                return Ok(());
            }

            match decrypt_password(encrypted) {
                Ok(password) => {
                    println!("Encrypted: {}", encrypted);
                    println!("Decrypted: {}", password);
                }
                Err(e) => {
                    eprintln!("Error: Failed to decrypt password");
                    eprintln!("This encrypted password was created on a different machine.");
                    eprintln!("Details: {}", e);
                }
            }
        }

        _ => {
            eprintln!("Error: Unknown command '{}'", args[1]);
            print_usage();
        }
    }

    Ok(())
}

fn print_usage() {
    println!("Usage:");
    println!("  cargo run --example encrypt_password -- encrypt <password>");
    println!("  cargo run --example encrypt_password -- decrypt <encrypted>");
}
