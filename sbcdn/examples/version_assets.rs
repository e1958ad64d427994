//! Exemple minimal de versionnement d'assets
//!
//! Usage:
//!   cargo run --example version_assets

use sbcdn::Cdn;

fn main() -> Result<(), sbcdn::Error> {
    let cdn = Cdn::new("demo")?;

    let v1 = cdn.version("app", ".js", b"console.log(1)")?;
    println!("first build:     {}", v1);

    let same = cdn.version("app", ".js", b"console.log(1)")?;
    println!("unchanged build: {}", same);

    let v2 = cdn.version("app", ".js", b"console.log(2)")?;
    println!("changed build:   {}", v2);

    println!("\nfiles under {}:", cdn.output_dir().display());
    for entry in std::fs::read_dir(cdn.output_dir())? {
        println!("  {}", entry?.file_name().to_string_lossy());
    }

    Ok(())
}
