use anyhow::Result;
use serde::Serialize;

use lineage_core::onchain::Chain;

#[derive(Debug, Serialize)]
pub struct ChainInfo {
    pub prefix: &'static str,
    pub credential_key: &'static str,
}

pub fn chain_infos() -> Vec<ChainInfo> {
    Chain::ALL
        .iter()
        .map(|chain| ChainInfo {
            prefix: chain.prefix(),
            credential_key: chain.credential_field().option_key(),
        })
        .collect()
}

/// List supported network prefixes and the analyzer option each API key is routed to.
pub fn list_chains_command(json: bool) -> Result<()> {
    let entries = chain_infos();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Chains:");
    for entry in entries {
        println!("- {} (api key -> {})", entry.prefix, entry.credential_key);
    }

    Ok(())
}
