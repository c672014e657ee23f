use log::*;
use procplay::{default_output_dir, parse_script, play_file, resolve_params, Action};
use roiproc::Session;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "procplay",
    about = "Apply ROI image processing commands to frames and record the results"
)]
struct Opt {
    /// JSON file with the operator parameters.
    ///
    /// If this is not provided, `proc_pars.json` in the output directory is used
    /// and created with default values when missing.
    #[structopt(long, parse(from_os_str))]
    json: Option<PathBuf>,
    /// Output directory. Defaults to the directory of the first frame.
    #[structopt(short = "O", long, parse(from_os_str))]
    output: Option<PathBuf>,
    /// Script with one command per line, or `select X0 Y0 X1 Y1 [TAG]`.
    #[structopt(long, parse(from_os_str))]
    script: Option<PathBuf>,
    /// A script line, run after the script file. May be repeated.
    #[structopt(short = "c", long = "command", number_of_values = 1)]
    commands: Vec<String>,
    /// The frames to process, in order.
    #[structopt(parse(from_os_str), required = true)]
    frames: Vec<PathBuf>,
}

fn main() {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();

    let output_dir = opt
        .output
        .clone()
        .unwrap_or_else(|| default_output_dir(&opt.frames[0]));
    std::fs::create_dir_all(&output_dir).expect("failed to create output directory");

    let params =
        resolve_params(opt.json.as_deref(), &output_dir).expect("failed to load parameters");

    let mut actions: Vec<Action> = match &opt.script {
        Some(path) => {
            let text = std::fs::read_to_string(path).expect("failed to read script");
            parse_script(&text).expect("invalid script")
        }
        None => vec![],
    };
    actions.extend(parse_script(&opt.commands.join("\n")).expect("invalid command"));
    info!("running {} actions on {} frames", actions.len(), opt.frames.len());

    let mut session = Session::new(params);
    for frame in &opt.frames {
        match play_file(&mut session, frame, &actions, &output_dir) {
            Ok(path) => println!("{}", path.display()),
            Err(e) => error!("{}: {}", frame.display(), e),
        }
    }
}
