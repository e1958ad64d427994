//! Exemple minimal d'utilisation du cache
//!
//! Mémorise un calcul coûteux dans le fichier local : la première exécution
//! invoque le fournisseur, les suivantes lisent le fichier.
//!
//! Usage:
//!   cargo run --example memoize

use anyhow::Result;
use sbcache::Cache;

fn main() -> Result<()> {
    let cache: Cache<String> = Cache::file("_tmp/cache.store")?;

    let value = cache.fetch("demo:expensive", || {
        println!("(cache miss, computing...)");
        Ok("the expensive result".to_string())
    })?;

    println!("value: {}", value);
    println!("store: _tmp/cache.store");

    Ok(())
}
