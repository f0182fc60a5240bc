//! Print a wallet balance.

use anyhow::Result;

use systest_client::HarnessConfig;
use systest_types::tokens::int_to_zcn;

use super::{connect, print_json};

/// Run the balance command.
pub async fn run(config: &HarnessConfig, client_id: &str, json: bool) -> Result<()> {
    let balance = connect(config)?.wallet_balance(client_id).await?;
    if json {
        return print_json(&balance);
    }
    println!("Balance: {:.3} ZCN ({} base units)", int_to_zcn(balance.balance), balance.balance);
    println!("  Nonce: {}", balance.nonce);
    println!("  Round: {}", balance.round);
    Ok(())
}
