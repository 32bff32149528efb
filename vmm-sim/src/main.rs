mod address_reader;
mod file_page_loader;

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{bail, Context};
use clap::Parser;
use log::{info, warn};
use vmm::{
    config::DEFAULT_BOUNDED_FRAMES, Mmu, MmuConfig, ReplacementPolicy, RunSummary, VmError,
};

use crate::{address_reader::AddressReader, file_page_loader::FilePageLoader};

/// Translates a list of virtual addresses through a simulated TLB, page
/// table and demand-paged physical memory.
#[derive(Parser, Debug)]
#[command(name = "vmm-sim", version)]
struct Cli {
    /// Backing store: the full virtual address space, page after page
    backing_store: PathBuf,

    /// Input file with one virtual address per line
    addresses: PathBuf,

    /// Replacement policy for a bounded frame pool: fifo (0) or lru (1).
    /// Without it every page gets its own frame
    #[arg(short = 'p', long, value_parser = parse_policy)]
    policy: Option<ReplacementPolicy>,

    /// Number of physical frames when a policy is given
    #[arg(short = 'f', long, requires = "policy")]
    frames: Option<usize>,

    /// Skip and count malformed address lines instead of aborting
    #[arg(long)]
    skip_malformed: bool,

    /// Only print the summary
    #[arg(short, long)]
    quiet: bool,
}

fn parse_policy(raw: &str) -> Result<ReplacementPolicy, String> {
    match raw.parse() {
        Ok(ReplacementPolicy::Unbounded) => Err("use no -p for the unbounded configuration".into()),
        Ok(policy) => Ok(policy),
        Err(err) => Err(err.to_string()),
    }
}

impl Cli {
    fn mmu_config(&self) -> anyhow::Result<MmuConfig> {
        match (self.policy, self.frames) {
            (None, None) => Ok(MmuConfig::unbounded()),
            (None, Some(_)) => bail!("--frames needs a replacement policy (-p)"),
            (Some(policy), frames) => Ok(MmuConfig::bounded(
                policy,
                frames.unwrap_or(DEFAULT_BOUNDED_FRAMES),
            )?),
        }
    }
}

fn run<W: Write>(cli: &Cli, out: &mut W) -> anyhow::Result<RunSummary> {
    let config = cli.mmu_config()?;

    let loader = FilePageLoader::open(&cli.backing_store)
        .with_context(|| format!("opening backing store {}", cli.backing_store.display()))?;
    let input = File::open(&cli.addresses)
        .with_context(|| format!("opening address list {}", cli.addresses.display()))?;

    let mut mmu = Mmu::new(config, loader)?;
    let mut skipped_addresses = 0;

    for address in AddressReader::new(BufReader::new(input)) {
        let address = match address {
            Ok(address) => address,
            Err(err @ VmError::MalformedAddress { .. }) if cli.skip_malformed => {
                warn!("skipping {}", err);
                skipped_addresses += 1;
                continue;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", cli.addresses.display()))
            }
        };

        let translation = mmu.translate(address)?;

        if !cli.quiet {
            writeln!(out, "{}", translation)?;
        }
    }

    let summary = RunSummary {
        statistics: *mmu.statistics(),
        skipped_addresses,
    };

    writeln!(out, "{}", summary)?;
    out.flush()?;

    info!("run finished with policy {} over {} frames", config.policy, config.frame_count);

    Ok(summary)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match run(&cli, &mut out) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = out.flush();
            eprintln!("vmm-sim: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;
    use vmm::address::{PAGE_COUNT, PAGE_SIZE};

    fn backing_store() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        let bytes: Vec<u8> = (0..PAGE_COUNT)
            .flat_map(|page| std::iter::repeat(page as u8).take(PAGE_SIZE))
            .collect();
        file.write_all(&bytes).unwrap();
        file
    }

    fn address_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vmm-sim").chain(args.iter().copied())).unwrap()
    }

    fn run_to_string(cli: &Cli) -> (anyhow::Result<RunSummary>, String) {
        let mut out = Vec::new();
        let result = run(cli, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn unbounded_run_prints_trace_and_summary() {
        let store = backing_store();
        let input = address_file("5130\n5130\n2050\n");
        let cli = cli(&[
            store.path().to_str().unwrap(),
            input.path().to_str().unwrap(),
        ]);

        let (result, output) = run_to_string(&cli);
        let summary = result.unwrap();

        assert_eq!(
            output,
            "Virtual address: 5130 Physical address: 10 Value: 5\n\
             Virtual address: 5130 Physical address: 10 Value: 5\n\
             Virtual address: 2050 Physical address: 1026 Value: 2\n\
             Number of Translated Addresses = 3\n\
             Page Faults = 2\n\
             Page Fault Rate = 0.667\n\
             TLB Hits = 1\n\
             TLB Hit Rate = 0.333\n"
        );
        assert_eq!(summary.statistics.total_addresses, 3);
    }

    #[test]
    fn bounded_fifo_with_one_frame_refaults() {
        let store = backing_store();
        let input = address_file("1024\n2048\n1024\n");
        let cli = cli(&[
            store.path().to_str().unwrap(),
            input.path().to_str().unwrap(),
            "-p",
            "0",
            "-f",
            "1",
            "--quiet",
        ]);

        let (result, output) = run_to_string(&cli);

        assert_eq!(result.unwrap().statistics.page_faults, 3);
        assert!(output.starts_with("Number of Translated Addresses = 3\n"));
    }

    #[test]
    fn malformed_line_aborts_by_default() {
        let store = backing_store();
        let input = address_file("1\nnope\n2\n");
        let cli = cli(&[
            store.path().to_str().unwrap(),
            input.path().to_str().unwrap(),
        ]);

        let (result, output) = run_to_string(&cli);
        let err = result.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<VmError>(),
            Some(VmError::MalformedAddress { .. })
        ));
        assert_eq!(output.lines().count(), 1);
    }

    #[test]
    fn malformed_lines_can_be_skipped_and_counted() {
        let store = backing_store();
        let input = address_file("1\nnope\n2000000\n2\n");
        let cli = cli(&[
            store.path().to_str().unwrap(),
            input.path().to_str().unwrap(),
            "--skip-malformed",
            "-q",
        ]);

        let (result, output) = run_to_string(&cli);

        assert_eq!(result.unwrap().skipped_addresses, 2);
        assert!(output.contains("Number of Translated Addresses = 2\n"));
        assert!(output.ends_with("Skipped Malformed Addresses = 2\n"));
    }

    #[test]
    fn unreadable_input_is_fatal_even_when_skipping() {
        let store = backing_store();
        let dir = tempfile::tempdir().unwrap();
        let cli = cli(&[
            store.path().to_str().unwrap(),
            dir.path().to_str().unwrap(),
            "--skip-malformed",
        ]);

        let (result, output) = run_to_string(&cli);
        let err = result.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<VmError>(),
            Some(VmError::InputUnreadable { line: 1, .. })
        ));
        assert!(output.is_empty());
    }

    #[test]
    fn empty_input_reports_undefined_rates() {
        let store = backing_store();
        let input = address_file("");
        let cli = cli(&[
            store.path().to_str().unwrap(),
            input.path().to_str().unwrap(),
        ]);

        let (result, output) = run_to_string(&cli);

        result.unwrap();
        assert!(output.contains("Page Fault Rate = undefined"));
    }

    #[test]
    fn bad_policy_and_frame_counts_are_rejected() {
        assert!(Cli::try_parse_from(["vmm-sim", "a", "b", "-p", "2"]).is_err());
        assert!(Cli::try_parse_from(["vmm-sim", "a", "b", "-f", "4"]).is_err());

        let zero = cli(&["a", "b", "-p", "lru", "-f", "0"]);
        assert!(zero.mmu_config().is_err());
    }

    #[test]
    fn missing_backing_store_fails_before_translating() {
        let input = address_file("1\n");
        let cli = cli(&["/nonexistent/BACKING_STORE.bin", input.path().to_str().unwrap()]);

        let (result, output) = run_to_string(&cli);

        assert!(result.is_err());
        assert!(output.is_empty());
    }
}
