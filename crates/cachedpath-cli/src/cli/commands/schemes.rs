//! `cachedpath schemes` – list fetchable URL schemes.

use anyhow::Result;
use cachedpath_core::{ResolveOptions, Resolver};

pub fn run_schemes() -> Result<()> {
    let resolver = Resolver::new(ResolveOptions::default());
    for scheme in resolver.registry().schemes() {
        println!("{scheme}");
        if scheme == "http" {
            println!("https");
        }
    }
    Ok(())
}
