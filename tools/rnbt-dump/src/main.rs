use std::{fmt::Write as _, thread};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::{Context as _, bail};
use clap::Parser;
use crossbeam::channel;
use log::{debug, error};

use rnbt_util::LockOrPanic as _;
use rnbt_world::{LoadOptions, McWorldDescriptor};


/// Print the contents of Minecraft region, NBT and JSON files as SNBT.
///
/// Set `RUST_LOG=debug` to see what is read from each file.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Also export the file as JSON to this path. Only allowed with a single input.
    #[arg(long, value_name = "OUT")]
    json:                Option<PathBuf>,
    /// Print each compound over several indented lines.
    #[arg(long)]
    pretty:              bool,
    /// Leave out region chunks that fail to load instead of failing the whole file.
    #[arg(long)]
    skip_invalid_chunks: bool,
    /// The number of files to load at once.
    #[arg(long, short, default_value_t = 2)]
    jobs:                usize,
    /// Region (.mca, .mcr), NBT (.nbt, .litematic, .schem, .dat, .mcstructure) or JSON files.
    #[arg(required = true)]
    paths:               Vec<PathBuf>,
}

#[derive(Debug, Clone)]
struct DumpOptions {
    pretty: bool,
    load:   LoadOptions,
    json:   Option<PathBuf>,
}


fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(true)  => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Dumps every input, returning whether all of them loaded.
fn run(args: Args) -> anyhow::Result<bool> {
    if args.json.is_some() && args.paths.len() != 1 {
        bail!("--json needs exactly one input file, but {} were given", args.paths.len());
    }

    let opts = DumpOptions {
        pretty: args.pretty,
        load:   LoadOptions { skip_invalid_chunks: args.skip_invalid_chunks },
        json:   args.json,
    };
    let jobs = args.jobs.clamp(1, args.paths.len());
    debug!("Dumping {} files on {jobs} threads", args.paths.len());

    let failures = Arc::new(Mutex::new(Vec::new()));
    let (path_sender, path_receiver) = channel::bounded::<PathBuf>(jobs);

    let workers: Vec<_> = (0..jobs)
        .map(|_| {
            let path_receiver = path_receiver.clone();
            let failures = Arc::clone(&failures);
            let opts = opts.clone();

            thread::spawn(move || {
                while let Ok(path) = path_receiver.recv() {
                    match dump(&path, &opts) {
                        Ok(output) => print!("{output}"),
                        Err(err) => {
                            error!("{err:#}");
                            failures.lock_or_panic().push(path);
                        }
                    }
                }
            })
        })
        .collect();

    for path in args.paths {
        if path_sender.send(path).is_err() {
            break;
        }
    }
    drop(path_sender);

    for worker in workers {
        if worker.join().is_err() {
            bail!("a worker thread panicked");
        }
    }

    let failures = failures.lock_or_panic();
    if !failures.is_empty() {
        error!("{} of the files could not be dumped", failures.len());
    }
    Ok(failures.is_empty())
}

/// Loads one file and renders its summary line and compounds.
fn dump(path: &Path, opts: &DumpOptions) -> anyhow::Result<String> {
    let descriptor = McWorldDescriptor::load_with_options(path, opts.load)
        .with_context(|| format!("could not load {}", path.display()))?;

    let mut output = String::new();
    writeln!(
        output,
        "{}: {}, version {}, {} compound(s)",
        path.display(),
        descriptor.file_kind(),
        descriptor.mc_version(),
        descriptor.tag_compounds().len(),
    )?;

    for compound in &descriptor {
        if let Some(position) = compound.chunk_position() {
            write!(output, "[chunk {}, {}] ", position.x, position.z)?;
        }
        if opts.pretty {
            writeln!(output, "{compound:#}")?;
        } else {
            writeln!(output, "{compound}")?;
        }
    }

    if let Some(json_path) = &opts.json {
        descriptor
            .to_json(json_path)
            .with_context(|| format!("could not export {} as JSON", path.display()))?;
        writeln!(output, "Exported to {}", json_path.display())?;
    }

    Ok(output)
}


#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn arguments() {
        Args::command().debug_assert();

        let args = Args::try_parse_from(["rnbt-dump", "--pretty", "-j", "4", "a.mca", "b.nbt"])
            .expect("valid arguments");
        assert!(args.pretty);
        assert_eq!(args.jobs, 4);
        assert_eq!(args.paths.len(), 2);

        assert!(Args::try_parse_from(["rnbt-dump"]).is_err());
    }

    #[test]
    fn json_needs_one_input() {
        let args = Args::try_parse_from(["rnbt-dump", "--json", "out.json", "a.nbt", "b.nbt"])
            .expect("valid arguments");
        assert!(run(args).is_err());
    }

    #[test]
    fn missing_files_fail() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let missing = dir.path().join("missing.nbt");

        let opts = DumpOptions { pretty: false, load: LoadOptions::default(), json: None };
        assert!(dump(&missing, &opts).is_err());

        let args = Args::try_parse_from([Path::new("rnbt-dump"), missing.as_path()])
            .expect("valid arguments");
        assert!(!run(args).expect("failures are reported, not returned"));
    }
}
