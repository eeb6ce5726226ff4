// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    apple_plist_inspect::{
        canonical::display_string, Plist, PlistError, PlistSearch, SystemProcessLookup,
    },
    clap::{Arg, ArgMatches, Command},
    log::{info, warn, LevelFilter},
};

const COMPARE_ABOUT: &str = "\
Compare the content of two plist files.

Plists are compared on their flattened content: nested dictionaries are
collapsed into dot-joined keys and every value is rendered in a canonical
textual form. Key order and file encoding (binary or XML) do not matter.

Both content digests are printed, followed by the verdict.
";

const FIND_ABOUT: &str = "\
Find plist files in a directory.

Files ending in .plist which decode as binary or XML plists are printed
along with their encoding and content digest. Files which fail to decode
are skipped. Run with -v to see which.
";

fn command_print_data(args: &ArgMatches) -> Result<(), PlistError> {
    let path = args.value_of("path").ok_or(PlistError::CliBadArgument)?;

    let plist = Plist::from_path(path)?;

    println!("# encoding: {}", plist.file_type()?);
    for (key, value) in plist.data()?.sorted_entries() {
        println!("{} = {}", key, display_string(value));
    }

    Ok(())
}

fn command_digest(args: &ArgMatches) -> Result<(), PlistError> {
    let paths = args.values_of("path").ok_or(PlistError::CliBadArgument)?;

    for path in paths {
        let plist = Plist::from_path(path)?;
        println!("{}  {}", plist.digest()?, path);
    }

    Ok(())
}

fn command_compare(args: &ArgMatches) -> Result<(), PlistError> {
    let path0 = args.value_of("path0").ok_or(PlistError::CliBadArgument)?;
    let path1 = args.value_of("path1").ok_or(PlistError::CliBadArgument)?;

    let a = Plist::from_path(path0)?;
    let b = Plist::from_path(path1)?;

    println!("{}  {}", a.digest()?, path0);
    println!("{}  {}", b.digest()?, path1);

    if a.content_eq(&b)? {
        println!("plists are equal");
    } else {
        println!("plists differ");
    }

    Ok(())
}

fn command_find(args: &ArgMatches) -> Result<(), PlistError> {
    let directory = args
        .value_of("directory")
        .ok_or(PlistError::CliBadArgument)?;
    let recursive = args.is_present("recursive");

    let search = PlistSearch::new(directory, recursive)?;

    let mut count = 0;
    for plist in &search {
        let plist = plist?;

        if let Some(path) = plist.path() {
            println!(
                "{}\t{}\t{}",
                plist.file_type()?,
                plist.digest()?,
                path.display()
            );
            count += 1;
        }
    }

    info!("found {} plists in {}", count, search.root().display());

    Ok(())
}

fn command_file_summary(args: &ArgMatches) -> Result<(), PlistError> {
    let path = args.value_of("path").ok_or(PlistError::CliBadArgument)?;

    let plist = Plist::from_path(path)?;
    println!("{}", serde_json::to_string_pretty(&plist.file_summary()?)?);

    Ok(())
}

fn command_processes(args: &ArgMatches) -> Result<(), PlistError> {
    let path = args.value_of("path").ok_or(PlistError::CliBadArgument)?;

    let plist = Plist::from_path(path)?;

    match plist.program()? {
        Some(program) => {
            info!("{} runs {}", path, program.display());
        }
        None => {
            warn!("{} does not define Program or ProgramArguments", path);
            return Ok(());
        }
    }

    for record in plist.associated_processes(&SystemProcessLookup)? {
        println!(
            "{}\t{}\t{}",
            record.pid,
            record.name,
            record.executable.display()
        );
    }

    Ok(())
}

fn path_arg() -> Arg<'static> {
    Arg::new("path")
        .required(true)
        .help("Path to plist file to examine")
}

fn main_impl() -> Result<(), PlistError> {
    let app = Command::new("rplist")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect and compare Apple property list files")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .multiple_occurrences(true)
                .help("Increase logging verbosity. Can be specified multiple times."),
        );

    let app = app.subcommand(
        Command::new("compare")
            .about("Compare the content of two plist files")
            .long_about(COMPARE_ABOUT)
            .arg(
                Arg::new("path0")
                    .required(true)
                    .help("The first plist to compare"),
            )
            .arg(
                Arg::new("path1")
                    .required(true)
                    .help("The second plist to compare"),
            ),
    );

    let app = app.subcommand(
        Command::new("digest")
            .about("Print the content digest of plist files")
            .arg(path_arg().multiple_values(true)),
    );

    let app = app.subcommand(
        Command::new("file-summary")
            .about("Print a JSON summary of the file backing a plist")
            .arg(path_arg()),
    );

    let app = app.subcommand(
        Command::new("find")
            .about("Find plist files in a directory")
            .long_about(FIND_ABOUT)
            .arg(
                Arg::new("directory")
                    .required(true)
                    .help("Directory to search"),
            )
            .arg(
                Arg::new("recursive")
                    .long("recursive")
                    .short('r')
                    .help("Search the entire directory tree"),
            ),
    );

    let app = app.subcommand(
        Command::new("print-data")
            .about("Print the flattened content of a plist")
            .arg(path_arg()),
    );

    let app = app.subcommand(
        Command::new("processes")
            .about("Print running processes of the program a launch agent plist runs")
            .arg(path_arg()),
    );

    let matches = app.get_matches();

    let log_level = match matches.occurrences_of("verbose") {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.as_str()),
    );

    // Disable log context except at higher log levels.
    if log_level <= LevelFilter::Info {
        builder
            .format_timestamp(None)
            .format_level(false)
            .format_target(false);
    }

    builder.init();

    match matches.subcommand() {
        Some(("compare", args)) => command_compare(args),
        Some(("digest", args)) => command_digest(args),
        Some(("file-summary", args)) => command_file_summary(args),
        Some(("find", args)) => command_find(args),
        Some(("print-data", args)) => command_print_data(args),
        Some(("processes", args)) => command_processes(args),
        _ => Err(PlistError::CliUnknownCommand),
    }
}

fn main() {
    let exit_code = match main_impl() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("Error: {}", err);
            1
        }
    };

    std::process::exit(exit_code)
}
