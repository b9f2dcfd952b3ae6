use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use zeroize::Zeroizing;

use hd_signer_core::utils::logging;
use hd_signer_core::{
    keccak_hash_message, AddressFamily, DerivationPath, Session, SessionConfig, SoftwareElement,
    DER_SIGNATURE_MAX_LEN, PK_LEN_SECP256K1,
};

/// Host-side driver for the signer core, backed by a software element
#[derive(Parser)]
#[command(name = "hd-signer", version)]
struct Cli {
    /// BIP-39 mnemonic phrase
    #[arg(long, global = true, conflicts_with = "seed_hex")]
    mnemonic: Option<String>,

    /// BIP-39 passphrase used with --mnemonic
    #[arg(long, global = true, default_value = "")]
    passphrase: String,

    /// Raw BIP-32 seed as hex (16 to 64 bytes)
    #[arg(long, global = true)]
    seed_hex: Option<String>,

    /// JSON session configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Derivation path, overrides the configuration
    #[arg(long, global = true)]
    path: Option<String>,

    /// Bech32 prefix, overrides the configuration
    #[arg(long, global = true)]
    hrp: Option<String>,

    /// Emit machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the public key and address for the session path
    Address {
        #[arg(long, value_enum, default_value_t = FamilyArg::Native)]
        family: FamilyArg,
    },
    /// Print the compressed public key for the session path
    Pubkey,
    /// Keccak-256 the transaction and sign it with the session key
    Sign {
        /// Transaction bytes as hex
        #[arg(long)]
        tx_hex: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FamilyArg {
    Native,
    Ethereum,
}

impl From<FamilyArg> for AddressFamily {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Native => AddressFamily::Native,
            FamilyArg::Ethereum => AddressFamily::Ethereum,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.debug {
        logging::enable_debug();
    }

    let config = resolve_config(&cli)?;
    let element = build_element(&cli)?;
    let mut session = config.clone().into_session(element)?;

    match cli.command {
        Command::Address { family } => {
            let family = AddressFamily::from(family);
            let (public_key, address) = session
                .address(family)
                .with_context(|| format!("building {} address", family))?;

            if cli.json {
                let output = json!({
                    "path": config.derivation_path,
                    "hrp": session.hrp(),
                    "family": family,
                    "public_key": public_key.to_hex(),
                    "address": address,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("Path:       {}", config.derivation_path);
                println!("Public key: {}", public_key);
                println!("Address:    {}", address);
            }
        }
        Command::Pubkey => {
            let mut out = [0u8; PK_LEN_SECP256K1];
            let public_key = session.extract_public_key(&mut out).context("extracting public key")?;

            if cli.json {
                let output = json!({
                    "path": config.derivation_path,
                    "public_key": public_key.to_hex(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", public_key);
            }
        }
        Command::Sign { tx_hex } => {
            let tx = hex::decode(tx_hex.trim().trim_start_matches("0x")).context("decoding --tx-hex")?;
            let signature = sign(&mut session, &tx)?;

            if cli.json {
                let output = json!({
                    "path": config.derivation_path,
                    "digest": hex::encode(keccak_hash_message(&tx)),
                    "signature": hex::encode(&signature),
                    "length": signature.len(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", hex::encode(&signature));
            }
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<SessionConfig> {
    let mut config = match &cli.config {
        Some(file) => SessionConfig::load(file).with_context(|| format!("loading config {}", file))?,
        None => SessionConfig::default(),
    };

    if let Some(path) = &cli.path {
        config.derivation_path = path
            .parse::<DerivationPath>()
            .with_context(|| format!("parsing --path {}", path))?;
    }
    if let Some(hrp) = &cli.hrp {
        config.hrp = hrp.clone();
    }

    config.validate()?;
    Ok(config)
}

fn build_element(cli: &Cli) -> Result<SoftwareElement> {
    if let Some(phrase) = &cli.mnemonic {
        return Ok(SoftwareElement::from_mnemonic(phrase, &cli.passphrase)?);
    }
    if let Some(seed_hex) = &cli.seed_hex {
        let seed = Zeroizing::new(hex::decode(seed_hex.trim()).context("decoding --seed-hex")?);
        return Ok(SoftwareElement::from_seed(&seed)?);
    }
    bail!("one of --mnemonic or --seed-hex is required")
}

fn sign(session: &mut Session<SoftwareElement>, tx: &[u8]) -> Result<Vec<u8>> {
    let mut buffer = [0u8; DER_SIGNATURE_MAX_LEN];
    let len = session.sign(tx, &mut buffer).context("signing transaction")?;
    Ok(buffer[..len].to_vec())
}
