//! # didcell CLI Entry Point
//!
//! Operator tooling around the verifier: decode the on-chain structures,
//! derive identities from genesis operations, and run the state machine
//! over JSON transaction fixtures.

use anyhow::{bail, Context};
use clap::Parser;
use serde::Deserialize;

use didcell_core::{Did, LocalId};
use didcell_molecule::{DidCellData, DidCellWitness};
use didcell_verifier::{verify_transaction, CellHost, CellSource};

/// didcell CLI — DID cell verifier toolchain.
///
/// Decodes cell data and witness payloads, derives did:plc identifiers,
/// and verifies transaction fixtures against the transition state machine.
#[derive(Parser, Debug)]
#[command(name = "didcell", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Decode a hex-encoded cell-data payload.
    DecodeData {
        /// The payload as hex.
        hex: String,
    },
    /// Decode a hex-encoded DID witness.
    DecodeWitness {
        /// The witness as hex.
        hex: String,
    },
    /// Derive the DID and local id from a genesis operation.
    DeriveDid {
        /// The genesis operation's exact bytes, as hex.
        hex: String,
    },
    /// Verify a JSON transaction fixture.
    Verify {
        /// Path to the fixture file.
        path: std::path::PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::DecodeData { hex } => decode_data(&hex),
        Commands::DecodeWitness { hex } => decode_witness(&hex),
        Commands::DeriveDid { hex } => derive_did(&hex),
        Commands::Verify { path } => verify_fixture(&path),
    }
}

fn decode_data(hex: &str) -> anyhow::Result<()> {
    let bytes = from_hex(hex)?;
    let data = DidCellData::decode(&bytes).context("cell data did not decode")?;
    let cell = data.as_v1();
    println!("version:  1");
    println!("document: {} bytes", cell.document.len());
    match &cell.local_id {
        None => println!("local id: (none — no did:plc association)"),
        Some(local_id) => match LocalId::new(local_id.clone()).to_did() {
            Ok(did) => println!("local id: {did}"),
            Err(e) => println!("local id: {} bytes, undecodable ({e})", local_id.len()),
        },
    }
    Ok(())
}

fn decode_witness(hex: &str) -> anyhow::Result<()> {
    let bytes = from_hex(hex)?;
    let witness = DidCellWitness::decode(&bytes).context("witness did not decode")?;
    let auth = &witness.local_id_authorization;
    println!("operations:  {}", auth.history.len());
    println!("key indices: {:?}", auth.rotation_key_indices);
    println!("signature:   {} bytes", auth.sig.len());
    for (i, op) in auth.history.iter().enumerate() {
        match didcell_plc::Operation::parse(op) {
            Ok(op) => println!(
                "op {i}: {:?}, {} rotation keys, prev {}",
                op.kind(),
                op.rotation_keys().len(),
                op.prev().unwrap_or("null"),
            ),
            Err(e) => println!("op {i}: unparseable ({e})"),
        }
    }
    Ok(())
}

fn derive_did(hex: &str) -> anyhow::Result<()> {
    let bytes = from_hex(hex)?;
    let op = didcell_plc::Operation::parse(&bytes).context("operation did not parse")?;
    if !op.is_genesis() {
        bail!("operation is not a genesis operation (prev is not null)");
    }
    let did = Did::from_genesis_bytes(&bytes);
    println!("did:      {did}");
    println!(
        "local id: {} bytes on chain",
        LocalId::from_did(&did).as_bytes().len()
    );
    Ok(())
}

/// A JSON description of one transaction's DID cell group.
#[derive(Debug, Deserialize)]
struct Fixture {
    tx_hash: String,
    type_script_args: String,
    #[serde(default)]
    inputs: Vec<String>,
    #[serde(default)]
    outputs: Vec<String>,
    witness: Option<String>,
    first_input_reference: String,
    #[serde(default)]
    did_output_index: u64,
}

struct FixtureHost {
    tx_hash: [u8; 32],
    args: Vec<u8>,
    inputs: Vec<Vec<u8>>,
    outputs: Vec<Vec<u8>>,
    witness: Option<Vec<u8>>,
    first_input_reference: Vec<u8>,
    did_output_index: u64,
}

impl CellHost for FixtureHost {
    fn tx_hash(&self) -> [u8; 32] {
        self.tx_hash
    }
    fn type_script_args(&self) -> Vec<u8> {
        self.args.clone()
    }
    fn group_cell_count(&self, source: CellSource) -> usize {
        match source {
            CellSource::GroupInput => self.inputs.len(),
            CellSource::GroupOutput => self.outputs.len(),
        }
    }
    fn cell_data(&self, index: usize, source: CellSource) -> Option<Vec<u8>> {
        match source {
            CellSource::GroupInput => self.inputs.get(index).cloned(),
            CellSource::GroupOutput => self.outputs.get(index).cloned(),
        }
    }
    fn did_witness(&self) -> Option<Vec<u8>> {
        self.witness.clone()
    }
    fn first_input_reference(&self) -> Vec<u8> {
        self.first_input_reference.clone()
    }
    fn did_output_index(&self) -> u64 {
        self.did_output_index
    }
}

fn verify_fixture(path: &std::path::Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let fixture: Fixture = serde_json::from_str(&raw).context("fixture is not valid JSON")?;

    let tx_hash_bytes = from_hex(&fixture.tx_hash)?;
    let tx_hash: [u8; 32] = tx_hash_bytes
        .as_slice()
        .try_into()
        .map_err(|_| anyhow::anyhow!("tx_hash must be 32 bytes"))?;

    let host = FixtureHost {
        tx_hash,
        args: from_hex(&fixture.type_script_args)?,
        inputs: fixture
            .inputs
            .iter()
            .map(|h| from_hex(h))
            .collect::<Result<_, _>>()?,
        outputs: fixture
            .outputs
            .iter()
            .map(|h| from_hex(h))
            .collect::<Result<_, _>>()?,
        witness: fixture.witness.as_deref().map(from_hex).transpose()?,
        first_input_reference: from_hex(&fixture.first_input_reference)?,
        did_output_index: fixture.did_output_index,
    };

    match verify_transaction(&host) {
        Ok(transition) => {
            println!("accepted: {transition}");
            Ok(())
        }
        Err(e) => {
            println!("rejected: {e}");
            std::process::exit(1);
        }
    }
}

fn from_hex(hex: &str) -> anyhow::Result<Vec<u8>> {
    let hex = hex.trim().trim_start_matches("0x");
    if hex.len() % 2 != 0 {
        bail!("hex string must have even length");
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .with_context(|| format!("invalid hex at position {i}"))
        })
        .collect()
}
