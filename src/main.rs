use motion_rug::trajectory::synthetic::Flock;
use motion_rug::{
    FrameOrderer, GridSize, Layout, Palette, Quantizer, Rug, RugAssembler, Trajectories,
};

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};

use image::ImageError;

use log::info;

use ndarray::{s, Array2};

use rand::SeedableRng;
use rand_pcg::Pcg64;

use rayon::ThreadPoolBuildError;

use std::cmp;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::exit;
use std::time::Instant;

/// How to render the rug.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum ModeArg {
    /// Rescale the values to 8-bit grayscale.
    Gray,
    /// Bin the values into a diverging color palette.
    Color,
}

/// The command line.
#[derive(Debug, Parser)]
#[command(version, author, about = "Render a motion rug of collective movement data")]
struct Cli {
    /// Read trajectories from a JSON file of [frame][entity][variable] samples
    #[arg(short, long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Number of frames to simulate when no input is given
    #[arg(long, default_value_t = 512)]
    frames: usize,

    /// Number of entities to simulate when no input is given
    #[arg(long, default_value_t = 128)]
    entities: usize,

    /// Seed the random number generator
    #[arg(short = 'e', long, default_value_t = 0)]
    seed: u64,

    /// Side length of the Hilbert curve grid (a power of two)
    #[arg(short, long, default_value_t = 64)]
    grid: u32,

    /// Variable slot of the x coordinate
    #[arg(long, default_value_t = 0)]
    x_var: usize,

    /// Variable slot of the y coordinate
    #[arg(long, default_value_t = 1)]
    y_var: usize,

    /// Variable slot of the attribute to visualize
    #[arg(short, long, default_value_t = 2)]
    attr: usize,

    /// Maximum x coordinate [default: the largest x in the data]
    #[arg(long)]
    x_max: Option<f64>,

    /// Maximum y coordinate [default: the largest y in the data]
    #[arg(long)]
    y_max: Option<f64>,

    /// Rendering mode
    #[arg(short, long, value_enum, default_value_t = ModeArg::Color)]
    mode: ModeArg,

    /// Lower bound of the color range [default: the smallest value]
    #[arg(long)]
    attr_min: Option<f64>,

    /// Upper bound of the color range [default: the largest value]
    #[arg(long)]
    attr_max: Option<f64>,

    /// Number of worker threads [default: one per CPU]
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Save the image to PATH
    #[arg(short, long, value_name = "PATH", default_value = "motion-rug.png")]
    output: PathBuf,

    /// Also save the raw rug matrix as JSON
    #[arg(long, value_name = "PATH")]
    raw: Option<PathBuf>,

    /// Log more details (repeat for even more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Error type for this app.
#[derive(Debug)]
enum AppError {
    ArgError(clap::Error),
    RuntimeError(Box<dyn Error>),
}

impl AppError {
    /// Create an error for an invalid argument.
    fn invalid_value(msg: &str) -> Self {
        Self::ArgError(Cli::command().error(ErrorKind::InvalidValue, msg))
    }

    /// Exit the program with this error.
    fn exit(&self) -> ! {
        match self {
            Self::ArgError(err) => err.exit(),
            Self::RuntimeError(err) => {
                eprintln!("{}", err);
                exit(1)
            }
        }
    }
}

impl From<clap::Error> for AppError {
    fn from(err: clap::Error) -> Self {
        Self::ArgError(err)
    }
}

impl From<motion_rug::Error> for AppError {
    fn from(err: motion_rug::Error) -> Self {
        Self::RuntimeError(Box::new(err))
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        Self::RuntimeError(Box::new(err))
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        Self::RuntimeError(Box::new(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::RuntimeError(Box::new(err))
    }
}

impl From<ThreadPoolBuildError> for AppError {
    fn from(err: ThreadPoolBuildError) -> Self {
        Self::RuntimeError(Box::new(err))
    }
}

/// Result type for this app.
type AppResult<T> = Result<T, AppError>;

/// The validated command line arguments.
#[derive(Debug)]
struct Args {
    cli: Cli,
    grid: GridSize,
    layout: Layout,
}

impl Args {
    fn parse() -> AppResult<Self> {
        let cli = Cli::try_parse()?;

        let grid = GridSize::new(cli.grid).map_err(|e| AppError::invalid_value(&e.to_string()))?;

        if let Some(0) = cli.threads {
            return Err(AppError::invalid_value("need at least one thread"));
        }

        let layout = Layout {
            x: cli.x_var,
            y: cli.y_var,
        };

        Ok(Self { cli, grid, layout })
    }
}

/// The motion rug application itself.
#[derive(Debug)]
struct App {
    args: Args,
    start_time: Instant,
}

impl App {
    /// Make the App.
    fn new(args: Args) -> Self {
        Self {
            args,
            start_time: Instant::now(),
        }
    }

    fn run(&mut self) -> AppResult<()> {
        if let Some(threads) = self.args.cli.threads {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()?;
        }

        let trajectories = self.load()?;
        info!(
            "Loaded {} frames of {} entities with {} variables",
            trajectories.frames(),
            trajectories.entities(),
            trajectories.variables(),
        );

        let rug = self.assemble(&trajectories)?;
        self.save(&rug)
    }

    fn load(&self) -> AppResult<Trajectories> {
        let cli = &self.args.cli;

        if let Some(path) = &cli.input {
            let reader = BufReader::new(File::open(path)?);
            Ok(Trajectories::from_json(reader)?)
        } else {
            let flock = Flock {
                frames: cli.frames,
                entities: cli.entities,
                ..Flock::default()
            };
            info!("Simulating a flock with seed {}", cli.seed);
            Ok(flock.simulate(&mut Pcg64::seed_from_u64(cli.seed)))
        }
    }

    fn assemble(&self, trajectories: &Trajectories) -> AppResult<Rug> {
        let cli = &self.args.cli;
        let layout = self.args.layout;

        let x_max = match cli.x_max {
            Some(max) => max,
            None => trajectories.max(layout.x)?,
        };
        let y_max = match cli.y_max {
            Some(max) => max,
            None => trajectories.max(layout.y)?,
        };
        trajectories.check_variable(cli.attr)?;

        let quantizer = Quantizer::new(self.args.grid, x_max, y_max)?;
        let assembler = RugAssembler::new(FrameOrderer::new(quantizer, layout), cli.attr);

        let frames = trajectories.frames();
        let entities = trajectories.entities();
        eprintln!(
            "Generating a {}x{} rug on a {}x{} grid",
            frames,
            entities,
            self.args.grid.get(),
            self.args.grid.get(),
        );

        let mut image = Array2::zeros((entities, frames));
        let interval = cmp::max(frames / 100, 1);
        let mut start = 0;
        while start < frames {
            let end = cmp::min(start + interval, frames);
            assembler.assemble_into(
                start,
                trajectories.view().slice(s![start..end, .., ..]),
                image.slice_mut(s![.., start..end]),
            )?;
            self.print_progress(end, frames)?;
            start = end;
        }

        Ok(Rug::new(image))
    }

    fn save(&self, rug: &Rug) -> AppResult<()> {
        let cli = &self.args.cli;

        match cli.mode {
            ModeArg::Gray => rug.to_gray_image()?.save(&cli.output)?,
            ModeArg::Color => rug
                .color_map(&Palette::default(), cli.attr_min, cli.attr_max)?
                .save(&cli.output)?,
        }
        info!("Saved {}", cli.output.display());

        if let Some(path) = &cli.raw {
            let rows: Vec<Vec<f64>> = rug.image().outer_iter().map(|row| row.to_vec()).collect();
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer(&mut writer, &rows)?;
            writer.flush()?;
            info!("Saved raw matrix to {}", path.display());
        }

        Ok(())
    }

    fn print_progress(&self, i: usize, size: usize) -> io::Result<()> {
        let mut term = match term::stderr() {
            Some(term) => term,
            None => return Ok(()),
        };

        let progress = 100.0 * (i as f64) / (size as f64);
        let mut rate = (i as f64) / self.start_time.elapsed().as_secs_f64();
        let mut unit = "frames/s";

        if rate >= 10_000.0 {
            rate /= 1_000.0;
            unit = "kframes/s";
        }

        let newline = if i == size { "\n" } else { "" };

        term.carriage_return()?;
        term.delete_line()?;

        write!(term, "{:>6.2}%  | {:4.0} {:>9}{}", progress, rate, unit, newline)
    }
}

fn main() {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    let level = match args.cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match App::new(args).run() {
        Ok(_) => {}
        Err(e) => e.exit(),
    }
}
