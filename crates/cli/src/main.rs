//! Rainkeep CLI
//!
//! A command-line tool for puzzle-based file encryption over the Rainbow and
//! Rainstorm keyed hashes.
//!
//! # Commands
//!
//! - `encrypt` - Encrypt a file with the puzzle block cipher
//! - `decrypt` - Decrypt a file produced by `encrypt`
//! - `hash` - Compute a Rainbow/Rainstorm digest of a file or stdin
//! - `info` - Print the header of an encrypted file

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use rainkeep_core::cipher::{self, EncryptParams, SearchMode};
use rainkeep_core::hash::{self, HashAlgorithm};
use rainkeep_core::header;
use rainkeep_core::random;

#[derive(Parser)]
#[command(name = "rainkeep")]
#[command(author = "Cyberia")]
#[command(version = "0.2.0")]
#[command(about = "Puzzle-based file encryption over the Rainbow/Rainstorm keyed hashes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file with the puzzle block cipher
    Encrypt {
        /// Path to the plaintext input file
        input: PathBuf,

        /// Path to write the encrypted output file
        output: PathBuf,

        /// Passphrase used to derive the subkey stream
        #[arg(short, long)]
        key: String,

        /// Hash algorithm: rainbow/bow or rainstorm/storm
        #[arg(long, default_value = "rainstorm")]
        algorithm: String,

        /// Hash output size in bits
        #[arg(long, default_value = "256")]
        bits: u32,

        /// 64-bit seed (IV); random if omitted
        #[arg(long)]
        seed: Option<u64>,

        /// Salt as a hex string; a random 16-byte salt is used if omitted
        #[arg(long)]
        salt: Option<String>,

        /// Plaintext bytes per puzzle block (max 255)
        #[arg(long, default_value = "16")]
        block_size: u8,

        /// Bytes per stored nonce (max 255)
        #[arg(long, default_value = "8")]
        nonce_size: u8,

        /// Search mode: prefix, sequence, series, scatter, mapscatter, parascatter
        #[arg(long, default_value = "scatter")]
        mode: String,

        /// Use a deterministic (counter-based) nonce instead of random draws
        #[arg(long)]
        deterministic: bool,

        /// Extra KDF-extended bytes appended to each block's final hash
        #[arg(long, default_value = "0")]
        output_extension: u32,

        /// Worker threads for parascatter mode (default: number of CPU cores)
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Decrypt a file produced by `encrypt`
    Decrypt {
        /// Path to the encrypted input file
        input: PathBuf,

        /// Path to write the recovered plaintext
        output: PathBuf,

        /// Passphrase used to derive the subkey stream
        #[arg(short, long)]
        key: String,
    },

    /// Compute a Rainbow/Rainstorm digest
    Hash {
        /// Path to the input file; reads stdin if omitted
        input: Option<PathBuf>,

        /// Hash algorithm: rainbow/bow or rainstorm/storm
        #[arg(long, default_value = "rainstorm")]
        algorithm: String,

        /// Hash output size in bits
        #[arg(long, default_value = "256")]
        bits: u32,

        /// 64-bit seed
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Print the header of an encrypted file
    Info {
        /// Path to the encrypted file
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encrypt {
            input,
            output,
            key,
            algorithm,
            bits,
            seed,
            salt,
            block_size,
            nonce_size,
            mode,
            deterministic,
            output_extension,
            threads,
        } => cmd_encrypt(
            &input,
            &output,
            &key,
            &algorithm,
            bits,
            seed,
            salt.as_deref(),
            block_size,
            nonce_size,
            &mode,
            deterministic,
            output_extension,
            threads,
        ),
        Commands::Decrypt { input, output, key } => cmd_decrypt(&input, &output, &key),
        Commands::Hash { input, algorithm, bits, seed } => cmd_hash(input.as_deref(), &algorithm, bits, seed),
        Commands::Info { input } => cmd_info(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_encrypt(
    input: &PathBuf,
    output: &PathBuf,
    key: &str,
    algorithm: &str,
    bits: u32,
    seed: Option<u64>,
    salt: Option<&str>,
    block_size: u8,
    nonce_size: u8,
    mode: &str,
    deterministic: bool,
    output_extension: u32,
    threads: Option<usize>,
) -> anyhow::Result<()> {
    let algo = HashAlgorithm::from_str(algorithm)?;
    let search_mode = SearchMode::from_str(mode)?;

    let seed = match seed {
        Some(s) => s,
        None => {
            let mut buf = [0u8; 8];
            random::fill_random(&mut buf)?;
            u64::from_le_bytes(buf)
        }
    };

    let salt = match salt {
        Some(hex_str) => hex::decode(hex_str).map_err(|e| anyhow::anyhow!("invalid --salt hex: {e}"))?,
        None => random::random_nonce(16)?,
    };

    let plaintext = std::fs::read(input)?;

    println!("Encrypting {} bytes from {}", plaintext.len(), input.display());
    println!("Algorithm: {} ({} bits)", algo.as_str(), bits);
    println!("Search mode: {}", search_mode.as_str());
    println!("Seed: 0x{seed:016x}");
    println!("Salt: {}", hex::encode(&salt));

    let params = EncryptParams {
        algo,
        hash_bits: bits,
        seed,
        salt,
        block_size,
        nonce_size,
        search_mode,
        deterministic_nonce: deterministic,
        output_extension,
        worker_count: threads,
    };

    let start = Instant::now();
    let mut out_file = File::create(output)?;
    cipher::encrypt(&plaintext, key.as_bytes(), &params, &mut out_file)?;

    println!("Wrote {} in {:.2}s", output.display(), start.elapsed().as_secs_f64());
    Ok(())
}

fn cmd_decrypt(input: &PathBuf, output: &PathBuf, key: &str) -> anyhow::Result<()> {
    let mut in_file = File::open(input)?;
    let mut out_buf = Vec::new();

    let start = Instant::now();
    cipher::decrypt(&mut in_file, key.as_bytes(), &mut out_buf)?;

    std::fs::write(output, &out_buf)?;
    println!(
        "Recovered {} bytes to {} in {:.2}s",
        out_buf.len(),
        output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn cmd_hash(input: Option<&std::path::Path>, algorithm: &str, bits: u32, seed: u64) -> anyhow::Result<()> {
    let algo = HashAlgorithm::from_str(algorithm)?;

    let data = match input {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let digest = hash::invoke(algo, bits, seed, &data)?;
    println!("{}", hex::encode(digest));
    Ok(())
}

fn cmd_info(input: &PathBuf) -> anyhow::Result<()> {
    let mut file = File::open(input)?;
    let hdr = header::read_header(&mut file)?;
    println!("{hdr}");
    io::stdout().flush().ok();
    Ok(())
}
