//! Chain operations through the wallet and storage CLIs.
//!
//! Every command runs with `--silent` and the wallet file
//! `<name>_wallet.json` from the configured directory. Output is reduced to
//! trimmed, non-empty lines of stdout followed by stderr, and checked against
//! what the CLI prints on success ("Allocation created: <id>", "locked",
//! "unlocked", "Balance: ...").
//!
//! Failed commands are retried a few times with a fixed delay; the network
//! occasionally rejects a transaction whose nonce raced another one.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use systest_types::tokens::{int_to_zcn, parse_balance_line};
use systest_types::{AllocationId, BlobberId, ProviderType, SystestError, WritePoolInfo};

use crate::config::CliConfig;
use crate::ops::{AllocationRequest, AllocationUpdate, BlobberUpdate, ChainOps, OpsError};

/// Prefix of the line printed by `newallocation`.
pub const ALLOCATION_CREATED: &str = "Allocation created: ";

/// Failure lines printed by `wp-lock` and `wp-unlock`.
pub mod wp_errors {
    /// Lock larger than the wallet balance.
    pub const OVER_BALANCE: &str =
        "Failed to lock tokens in write pool: write_pool_lock_failed: lock amount is greater than balance";
    /// Negative `--tokens`.
    pub const NEGATIVE: &str = "invalid token amount: negative";
    /// Zero `--tokens`.
    pub const ZERO: &str =
        "Failed to lock tokens in write pool: write_pool_lock_failed: insufficient amount to lock";
    /// `--tokens` omitted.
    pub const MISSING_TOKENS: &str = "missing required 'tokens' flag";
    /// `--duration` omitted.
    pub const MISSING_DURATION: &str = "missing required 'duration' flag";
    /// Unlock before the lock duration passed.
    pub const NOT_EXPIRED: &str =
        "Failed to unlock tokens in write pool: write_pool_unlock_failed: the pool is not expired yet";
}

/// External programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    /// Wallet CLI.
    Zwallet,
    /// Storage CLI.
    Zbox,
}

/// Result of one command run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, -1 if killed by a signal.
    pub exit_code: i32,
    /// Trimmed, non-empty output lines.
    pub lines: Vec<String>,
}

impl CommandOutput {
    /// Whether the command exited cleanly.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Split command output into trimmed, non-empty lines.
pub fn output_lines(stdout: &str, stderr: &str) -> Vec<String> {
    stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Id printed by `newallocation`.
pub fn parse_allocation_created(lines: &[String]) -> Result<AllocationId, SystestError> {
    let line = lines
        .iter()
        .find_map(|l| l.strip_prefix(ALLOCATION_CREATED))
        .ok_or_else(|| SystestError::InvalidId(lines.join("\n")))?;
    AllocationId::parse(line.trim())
}

/// Arguments of `wp-lock`. `None` leaves the flag out.
pub fn write_pool_lock_args(
    allocation: &AllocationId,
    amount: Option<i64>,
    duration: Option<&str>,
) -> Vec<String> {
    let mut args = vec![
        "wp-lock".to_string(),
        "--allocation".to_string(),
        allocation.to_string(),
    ];
    if let Some(duration) = duration {
        args.extend(["--duration".to_string(), duration.to_string()]);
    }
    if let Some(amount) = amount {
        args.extend(["--tokens".to_string(), format_tokens(amount)]);
    }
    args
}

/// Token amount as the CLIs expect it (ZCN, decimal).
pub fn format_tokens(amount: i64) -> String {
    int_to_zcn(amount).to_string()
}

/// Runs commands and implements [`ChainOps`] on top of them.
#[derive(Debug, Clone)]
pub struct CliOps {
    config: CliConfig,
}

impl CliOps {
    /// Create a runner with the given settings.
    pub fn new(config: CliConfig) -> Self {
        Self { config }
    }

    fn program_path(&self, program: Program) -> &Path {
        match program {
            Program::Zwallet => &self.config.zwallet_path,
            Program::Zbox => &self.config.zbox_path,
        }
    }

    /// Wallet file name for `wallet`.
    pub fn wallet_file(wallet: &str) -> String {
        format!("{}_wallet.json", wallet)
    }

    /// Full argument list for a command.
    pub fn args(&self, args: &[String], wallet: &str) -> Vec<String> {
        let mut all = args.to_vec();
        all.extend([
            "--silent".to_string(),
            "--wallet".to_string(),
            Self::wallet_file(wallet),
            "--configDir".to_string(),
            self.config.config_dir.display().to_string(),
            "--config".to_string(),
            self.config.network_config.clone(),
        ]);
        all
    }

    /// Run a command once.
    pub async fn run_once(
        &self,
        program: Program,
        args: &[String],
        wallet: &str,
    ) -> Result<CommandOutput, OpsError> {
        let path = self.program_path(program);
        let args = self.args(args, wallet);
        debug!("running {} {}", path.display(), args.join(" "));

        let output = tokio::process::Command::new(path)
            .args(&args)
            .output()
            .await
            .map_err(|source| OpsError::Spawn {
                program: path.display().to_string(),
                source,
            })?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            lines: output_lines(
                &String::from_utf8_lossy(&output.stdout),
                &String::from_utf8_lossy(&output.stderr),
            ),
        })
    }

    /// Run a command, retrying on a failure exit status.
    pub async fn run(
        &self,
        program: Program,
        args: &[String],
        wallet: &str,
    ) -> Result<Vec<String>, OpsError> {
        let attempts = self.config.attempts.max(1);
        let delay = Duration::from_millis(self.config.retry_delay_ms);
        let mut attempt = 1;
        loop {
            let output = self.run_once(program, args, wallet).await?;
            if output.success() {
                return Ok(output.lines);
            }
            if attempt >= attempts {
                return Err(OpsError::CommandFailed {
                    command: args.join(" "),
                    exit_code: output.exit_code,
                    output: output.lines,
                });
            }
            warn!(
                "`{}` failed (exit {}), retry {}/{}",
                args.join(" "),
                output.exit_code,
                attempt,
                attempts - 1
            );
            attempt += 1;
            tokio::time::sleep(delay).await;
        }
    }

    async fn run_expecting(
        &self,
        program: Program,
        args: &[String],
        wallet: &str,
        expected: &str,
    ) -> Result<(), OpsError> {
        let lines = self.run(program, args, wallet).await?;
        if lines.len() == 1 && lines[0] == expected {
            Ok(())
        } else {
            Err(OpsError::UnexpectedOutput {
                command: args.join(" "),
                output: lines,
            })
        }
    }

    async fn run_ok(
        &self,
        program: Program,
        args: &[String],
        wallet: &str,
    ) -> Result<(), OpsError> {
        self.run(program, args, wallet).await.map(|_| ())
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

fn provider_flag(
    provider_type: ProviderType,
) -> Result<(Program, &'static str, &'static str), OpsError> {
    match provider_type {
        ProviderType::Blobber => Ok((Program::Zbox, "sp", "--blobber_id")),
        ProviderType::Validator => Ok((Program::Zbox, "sp", "--validator_id")),
        ProviderType::Miner => Ok((Program::Zwallet, "mn", "--miner_id")),
        ProviderType::Sharder => Ok((Program::Zwallet, "mn", "--sharder_id")),
        other => Err(OpsError::UnsupportedProvider(other)),
    }
}

#[async_trait]
impl ChainOps for CliOps {
    async fn register_wallet(&self, wallet: &str) -> Result<(), OpsError> {
        self.run_ok(Program::Zwallet, &owned(&["create-wallet"]), wallet)
            .await
    }

    async fn faucet(&self, wallet: &str, amount: i64) -> Result<(), OpsError> {
        let args = vec![
            "faucet".to_string(),
            "--methodName".to_string(),
            "pour".to_string(),
            "--input".to_string(),
            "{Pay day}".to_string(),
            "--tokens".to_string(),
            format_tokens(amount),
        ];
        self.run_ok(Program::Zwallet, &args, wallet).await
    }

    async fn balance(&self, wallet: &str) -> Result<i64, OpsError> {
        let args = owned(&["getbalance"]);
        let lines = self.run(Program::Zwallet, &args, wallet).await?;
        match lines.as_slice() {
            [line] => Ok(parse_balance_line(line)?),
            _ => Err(OpsError::UnexpectedOutput {
                command: args.join(" "),
                output: lines,
            }),
        }
    }

    async fn create_allocation(
        &self,
        wallet: &str,
        request: &AllocationRequest,
    ) -> Result<AllocationId, OpsError> {
        let args = vec![
            "newallocation".to_string(),
            "--lock".to_string(),
            format_tokens(request.lock),
            "--size".to_string(),
            request.size.to_string(),
            "--data".to_string(),
            request.data_shards.to_string(),
            "--parity".to_string(),
            request.parity_shards.to_string(),
            "--expire".to_string(),
            request.expire.clone(),
        ];
        let lines = self.run(Program::Zbox, &args, wallet).await?;
        Ok(parse_allocation_created(&lines)?)
    }

    async fn update_allocation(
        &self,
        wallet: &str,
        allocation: &AllocationId,
        update: &AllocationUpdate,
    ) -> Result<(), OpsError> {
        let mut args = vec![
            "updateallocation".to_string(),
            "--allocation".to_string(),
            allocation.to_string(),
        ];
        if let Some(size) = update.size {
            args.extend(["--size".to_string(), size.to_string()]);
        }
        if let Some(extend) = &update.extend {
            args.extend(["--expiry".to_string(), extend.clone()]);
        }
        if let Some(lock) = update.lock {
            args.extend(["--lock".to_string(), format_tokens(lock)]);
        }
        self.run_ok(Program::Zbox, &args, wallet).await
    }

    async fn add_blobber(
        &self,
        wallet: &str,
        allocation: &AllocationId,
        blobber: &BlobberId,
    ) -> Result<(), OpsError> {
        let args = vec![
            "updateallocation".to_string(),
            "--allocation".to_string(),
            allocation.to_string(),
            "--add_blobber".to_string(),
            blobber.to_string(),
        ];
        self.run_ok(Program::Zbox, &args, wallet).await
    }

    async fn cancel_allocation(
        &self,
        wallet: &str,
        allocation: &AllocationId,
    ) -> Result<(), OpsError> {
        let args = vec![
            "alloc-cancel".to_string(),
            "--allocation".to_string(),
            allocation.to_string(),
        ];
        self.run_ok(Program::Zbox, &args, wallet).await
    }

    async fn update_blobber(
        &self,
        wallet: &str,
        blobber: &BlobberId,
        update: &BlobberUpdate,
    ) -> Result<(), OpsError> {
        let mut args = vec![
            "bl-update".to_string(),
            "--blobber_id".to_string(),
            blobber.to_string(),
        ];
        if let Some(capacity) = update.capacity {
            args.extend(["--capacity".to_string(), capacity.to_string()]);
        }
        if let Some(price) = update.write_price {
            args.extend(["--write_price".to_string(), format_tokens(price)]);
        }
        if let Some(price) = update.read_price {
            args.extend(["--read_price".to_string(), format_tokens(price)]);
        }
        self.run_ok(Program::Zbox, &args, wallet).await
    }

    async fn stake(
        &self,
        wallet: &str,
        provider_type: ProviderType,
        provider_id: &str,
        amount: i64,
    ) -> Result<(), OpsError> {
        let (program, prefix, flag) = provider_flag(provider_type)?;
        let args = vec![
            format!("{}-lock", prefix),
            flag.to_string(),
            provider_id.to_string(),
            "--tokens".to_string(),
            format_tokens(amount),
        ];
        self.run_ok(program, &args, wallet).await
    }

    async fn unstake(
        &self,
        wallet: &str,
        provider_type: ProviderType,
        provider_id: &str,
    ) -> Result<(), OpsError> {
        let (program, prefix, flag) = provider_flag(provider_type)?;
        let args = vec![
            format!("{}-unlock", prefix),
            flag.to_string(),
            provider_id.to_string(),
        ];
        self.run_ok(program, &args, wallet).await
    }

    async fn write_pool_lock(
        &self,
        wallet: &str,
        allocation: &AllocationId,
        amount: i64,
        duration: &str,
    ) -> Result<(), OpsError> {
        let args = write_pool_lock_args(allocation, Some(amount), Some(duration));
        self.run_expecting(Program::Zbox, &args, wallet, "locked")
            .await
    }

    async fn write_pool_unlock(&self, wallet: &str, pool_id: &str) -> Result<(), OpsError> {
        let args = vec![
            "wp-unlock".to_string(),
            "--pool_id".to_string(),
            pool_id.to_string(),
        ];
        self.run_expecting(Program::Zbox, &args, wallet, "unlocked")
            .await
    }

    async fn write_pool_info(&self, wallet: &str) -> Result<Vec<WritePoolInfo>, OpsError> {
        let args = owned(&["wp-info", "--json"]);
        let lines = self.run(Program::Zbox, &args, wallet).await?;
        match lines.as_slice() {
            [json] => Ok(serde_json::from_str(json)?),
            _ => Err(OpsError::UnexpectedOutput {
                command: args.join(" "),
                output: lines,
            }),
        }
    }

    async fn read_pool_lock(&self, wallet: &str, amount: i64) -> Result<(), OpsError> {
        let args = vec![
            "rp-lock".to_string(),
            "--tokens".to_string(),
            format_tokens(amount),
        ];
        self.run_ok(Program::Zbox, &args, wallet).await
    }

    async fn read_pool_unlock(&self, wallet: &str) -> Result<(), OpsError> {
        self.run_ok(Program::Zbox, &owned(&["rp-unlock"]), wallet)
            .await
    }

    async fn upload(
        &self,
        wallet: &str,
        allocation: &AllocationId,
        local: &Path,
        remote: &str,
    ) -> Result<(), OpsError> {
        let args = vec![
            "upload".to_string(),
            "--allocation".to_string(),
            allocation.to_string(),
            "--localpath".to_string(),
            local.display().to_string(),
            "--remotepath".to_string(),
            remote.to_string(),
        ];
        self.run_ok(Program::Zbox, &args, wallet).await
    }

    async fn delete_file(
        &self,
        wallet: &str,
        allocation: &AllocationId,
        remote: &str,
    ) -> Result<(), OpsError> {
        let args = vec![
            "delete".to_string(),
            "--allocation".to_string(),
            allocation.to_string(),
            "--remotepath".to_string(),
            remote.to_string(),
        ];
        self.run_ok(Program::Zbox, &args, wallet).await
    }
}
