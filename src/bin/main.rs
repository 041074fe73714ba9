use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use env_logger::Env;

use classdeps::{ClassAnalysis, ClassId, Config};

#[derive(Parser)]
#[command(name = "classdeps")]
#[command(about = "Classfile dependency closure and API profiles")]
#[command(version)]
struct Cli {
    /// More logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow references from root classes and write the reports
    Analyze {
        /// Source tree name used in the dependency fragment
        #[arg(long, default_value = "default")]
        tree: String,

        /// Directory holding .java sources (repeatable)
        #[arg(long = "source-root", value_name = "DIR")]
        source_roots: Vec<PathBuf>,

        /// Directory holding compiled classes (repeatable)
        #[arg(long = "class-root", value_name = "DIR", required = true)]
        class_roots: Vec<PathBuf>,

        /// Public profile output
        #[arg(long, value_name = "FILE")]
        api: Option<PathBuf>,

        /// Package-private profile output
        #[arg(long, value_name = "FILE")]
        ppi: Option<PathBuf>,

        /// Internal classfile list output
        #[arg(long, value_name = "FILE")]
        list: Option<PathBuf>,

        /// Make dependency fragment output
        #[arg(long, value_name = "FILE")]
        deps: Option<PathBuf>,

        /// Source list output
        #[arg(long, value_name = "FILE")]
        srclist: Option<PathBuf>,

        /// Imported packages output
        #[arg(long, value_name = "FILE")]
        imports: Option<PathBuf>,

        /// Provided packages output
        #[arg(long, value_name = "FILE")]
        exports: Option<PathBuf>,

        /// Also follow field and method signatures
        #[arg(long)]
        member_signatures: bool,

        /// Start from every classfile under the class roots
        #[arg(long)]
        all: bool,

        /// Root classes, e.g. com/example/Main
        #[arg(value_name = "CLASS")]
        roots: Vec<String>,
    },

    /// Print the profile of classfiles
    Profile {
        /// Only the public profile
        #[arg(long)]
        public: bool,

        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the runtime class references of classfiles
    Refs {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Analyze {
            tree,
            source_roots,
            class_roots,
            api,
            ppi,
            list,
            deps,
            srclist,
            imports,
            exports,
            member_signatures,
            all,
            roots,
        } => {
            let mut config = Config::new()
                .with_tree(tree)
                .with_member_signatures(member_signatures)
                .with_all_classes(all);
            config.source_roots = source_roots;
            config.class_roots = class_roots;
            for root in &roots {
                let id = ClassId::parse(root).with_context(|| format!("bad root class '{}'", root))?;
                config = config.with_root(id);
            }
            config.api_file = api;
            config.ppi_file = ppi;
            config.list_file = list;
            config.deps_file = deps;
            config.srclist_file = srclist;
            config.imports_file = imports;
            config.exports_file = exports;
            analyze(&config)?;
        }
        Commands::Profile { public, files } => {
            profile_files(&files, public)?;
        }
        Commands::Refs { files } => {
            refs_files(&files)?;
        }
    }

    Ok(())
}

fn init_logger(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_target(false)
        .format_timestamp_millis()
        .init();
}

fn analyze(config: &Config) -> Result<()> {
    let report = classdeps::run(config).context("analysis failed")?;
    println!(
        "{} classes analyzed, {} internal, {} external",
        report.analyzed,
        report.tracker.needed_classes().len(),
        report.tracker.external_classes().len()
    );
    Ok(())
}

fn load(path: &PathBuf) -> Result<ClassAnalysis> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    ClassAnalysis::parse(None, &bytes).with_context(|| format!("decoding {}", path.display()))
}

fn profile_files(files: &[PathBuf], public: bool) -> Result<()> {
    let mut lines = classdeps::ProfileLines::new();
    for path in files {
        load(path)?.create_profiles(&mut lines);
    }
    let selected = if public { &lines.public } else { &lines.package };
    for line in selected {
        println!("{}", line);
    }
    Ok(())
}

fn refs_files(files: &[PathBuf]) -> Result<()> {
    let mut refs = BTreeSet::new();
    for path in files {
        refs.extend(load(path)?.runtime_class_references());
    }
    for id in refs {
        println!("{}", id);
    }
    Ok(())
}
