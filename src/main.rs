use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command, ValueEnum};
use pixelart::codec;
use pixelart::{
    fit_to_max_width, AspectLock, BlockSampling, ColorType, GridEdit, KmeansQuantizer,
    OutlineStrength, OutputFormat, PixelBuffer, Pipeline, PipelineConfig, QuantizationLevel,
    QuantizationStrategy, TargetGrid,
};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ColorsArg {
    #[value(name = "4")]
    C4,
    #[value(name = "8")]
    C8,
    #[value(name = "16")]
    C16,
    #[value(name = "32")]
    C32,
    #[value(name = "64")]
    C64,
    Unlimited,
}

impl From<ColorsArg> for QuantizationLevel {
    fn from(arg: ColorsArg) -> Self {
        match arg {
            ColorsArg::C4 => QuantizationLevel::Four,
            ColorsArg::C8 => QuantizationLevel::Eight,
            ColorsArg::C16 => QuantizationLevel::Sixteen,
            ColorsArg::C32 => QuantizationLevel::ThirtyTwo,
            ColorsArg::C64 => QuantizationLevel::SixtyFour,
            ColorsArg::Unlimited => QuantizationLevel::Unlimited,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum QuantizerArg {
    Uniform,
    Kmeans,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ColorSpace {
    Lab,
    Rgb,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutlineArg {
    #[value(name = "none")]
    Off,
    Weak,
    Normal,
    Strong,
}

impl From<OutlineArg> for OutlineStrength {
    fn from(arg: OutlineArg) -> Self {
        match arg {
            OutlineArg::Off => OutlineStrength::None,
            OutlineArg::Weak => OutlineStrength::Weak,
            OutlineArg::Normal => OutlineStrength::Normal,
            OutlineArg::Strong => OutlineStrength::Strong,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SamplingArg {
    Center,
    Average,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Png,
    Jpeg,
}

fn cli() -> Command {
    Command::new("pixelize")
        .version("0.1")
        .about("Turn the input image into pixel art.")
        .arg(
            Arg::new("input")
                .help("Sets the input file to use")
                .required(true)
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Sets an optional output file (default: <input>_pixelized.<ext>)"),
        )
        .arg(
            Arg::new("grid")
                .long("grid")
                .value_name("W,H")
                .help("Number of blocks across and down.")
                .conflicts_with_all(["width", "height", "dots", "scale"]),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .value_name("UINT")
                .value_parser(value_parser!(u32))
                .help("Blocks across. Alone, the height follows the image's aspect ratio.")
                .conflicts_with_all(["dots", "scale"]),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .value_name("UINT")
                .value_parser(value_parser!(u32))
                .help("Blocks down. Alone, the width follows the image's aspect ratio.")
                .conflicts_with_all(["dots", "scale"]),
        )
        .arg(
            Arg::new("dots")
                .long("dots")
                .value_name("UINT")
                .value_parser(value_parser!(u32))
                .help("Blocks along the longer side of the image.")
                .conflicts_with("scale"),
        )
        .arg(
            Arg::new("scale")
                .short('s')
                .long("scale")
                .value_name("UINT")
                .value_parser(value_parser!(u32))
                .help("One block per SCALE x SCALE source pixels."),
        )
        .group(
            ArgGroup::new("dimension")
                .args(["grid", "width", "height", "dots", "scale"])
                .multiple(true)
                .required(true),
        )
        .arg(
            Arg::new("colors")
                .long("colors")
                .short('k')
                .help("Levels per colour channel (or palette size with --quantizer kmeans).")
                .value_name("LEVELS")
                .value_parser(value_parser!(ColorsArg))
                .default_value("unlimited"),
        )
        .arg(
            Arg::new("quantizer")
                .long("quantizer")
                .help("Colour reduction method.")
                .value_parser(value_parser!(QuantizerArg))
                .default_value("uniform"),
        )
        .arg(
            Arg::new("color_space")
                .long("color-space")
                .short('c')
                .help("The color space used by the kmeans quantizer.")
                .value_parser(value_parser!(ColorSpace))
                .default_value("lab"),
        )
        .arg(
            Arg::new("num_runs")
                .long("num-runs")
                .short('r')
                .help("The number of runs for the kmeans algorithm.")
                .value_name("UINT")
                .value_parser(value_parser!(u32))
                .default_value("3"),
        )
        .arg(
            Arg::new("max_iter")
                .long("max-iter")
                .short('i')
                .help("The maximum number of iterations for the kmeans algorithm.")
                .value_name("UINT")
                .value_parser(value_parser!(usize))
                .default_value("20"),
        )
        .arg(
            Arg::new("outline")
                .long("outline")
                .help("Outline strength.")
                .value_parser(value_parser!(OutlineArg))
                .default_value("none"),
        )
        .arg(
            Arg::new("sampling")
                .long("sampling")
                .help("How each block picks its colour.")
                .value_parser(value_parser!(SamplingArg))
                .default_value("center"),
        )
        .arg(
            Arg::new("max_width")
                .long("max-width")
                .value_name("UINT")
                .value_parser(value_parser!(u32))
                .help("Shrink the output canvas to at most this width, e.g. 350."),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .help("Output format (default: from the output extension, else png).")
                .value_parser(value_parser!(FormatArg)),
        )
        .arg(
            Arg::new("quality")
                .long("quality")
                .short('q')
                .help("JPEG quality, 1-100.")
                .value_name("UINT")
                .value_parser(value_parser!(u8))
                .default_value("90"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Prints debug information verbosely.")
                .action(ArgAction::SetTrue),
        )
}

fn main() -> Result<(), Box<dyn Error>> {
    let matches = cli().get_matches();

    let verbose = matches.get_flag("verbose");
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "info" }),
    )
    .init();

    let input_path = matches
        .get_one::<PathBuf>("input")
        .ok_or("missing input file")?;
    let source = codec::open(input_path)?;
    log::info!(
        "Using input file: {} ({}x{})",
        input_path.display(),
        source.width(),
        source.height()
    );

    let grid = target_grid(&matches, &source)?;
    let (output_width, output_height) = match matches.get_one::<u32>("max_width") {
        Some(&max_width) => fit_to_max_width(source.width(), source.height(), max_width),
        None => source.dimensions(),
    };
    log::info!(
        "Target grid: {}x{} blocks on a {}x{} canvas",
        grid.blocks_wide,
        grid.blocks_high,
        output_width,
        output_height
    );

    let config = PipelineConfig {
        quantization: matches
            .get_one::<ColorsArg>("colors")
            .copied()
            .map(QuantizationLevel::from)
            .unwrap_or_default(),
        quantizer: quantizer(&matches),
        outline: matches
            .get_one::<OutlineArg>("outline")
            .copied()
            .map(OutlineStrength::from)
            .unwrap_or_default(),
        sampling: match matches.get_one::<SamplingArg>("sampling") {
            Some(SamplingArg::Average) => BlockSampling::Average,
            _ => BlockSampling::Center,
        },
        grid,
        output_width,
        output_height,
    };

    let mut pipeline = Pipeline::new();
    pipeline.load(source)?;
    let pixelated = pipeline.run(&config)?;

    let output = matches.get_one::<PathBuf>("output");
    let format = match matches.get_one::<FormatArg>("format") {
        Some(FormatArg::Png) => OutputFormat::Png,
        Some(FormatArg::Jpeg) => OutputFormat::Jpeg,
        None => output
            .and_then(|path| path.extension())
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .unwrap_or_default(),
    };
    let output_path = match output {
        Some(path) => path.clone(),
        None => default_output_path(input_path, format),
    };

    let quality = matches.get_one::<u8>("quality").copied().unwrap_or(90);
    let bytes = codec::encode(pixelated, format, quality)?;
    std::fs::write(&output_path, bytes)?;
    log::info!("Pixel art saved to {}", output_path.display());

    Ok(())
}

fn quantizer(matches: &ArgMatches) -> QuantizationStrategy {
    match matches.get_one::<QuantizerArg>("quantizer") {
        Some(QuantizerArg::Kmeans) => {
            let num_runs = matches.get_one::<u32>("num_runs").copied().unwrap_or(3);
            let max_iter = matches.get_one::<usize>("max_iter").copied().unwrap_or(20);
            let color_type = match matches.get_one::<ColorSpace>("color_space") {
                Some(ColorSpace::Rgb) => ColorType::Rgb,
                _ => ColorType::Lab,
            };
            QuantizationStrategy::Kmeans(KmeansQuantizer::new(num_runs, max_iter, color_type))
        }
        _ => QuantizationStrategy::Uniform,
    }
}

fn target_grid(matches: &ArgMatches, source: &PixelBuffer) -> Result<TargetGrid, Box<dyn Error>> {
    let (width, height) = source.dimensions();
    if let Some(size) = matches.get_one::<String>("grid") {
        let (w, h) = parse_size(size)?;
        return Ok(TargetGrid::new(w, h)?);
    }
    if let Some(&dots) = matches.get_one::<u32>("dots") {
        return Ok(TargetGrid::from_longest_side(dots, width, height)?);
    }
    if let Some(&scale) = matches.get_one::<u32>("scale") {
        return Ok(TargetGrid::from_scale(scale, width, height)?);
    }

    let blocks_wide = matches.get_one::<u32>("width").copied();
    let blocks_high = matches.get_one::<u32>("height").copied();
    // Both given: independent. One given: the aspect lock derives the other.
    let locked = blocks_wide.is_none() || blocks_high.is_none();
    let lock = AspectLock::from_dimensions(width, height, locked)?;
    let mut grid = TargetGrid {
        blocks_wide: blocks_wide.unwrap_or(1),
        blocks_high: blocks_high.unwrap_or(1),
    };
    if let Some(w) = blocks_wide {
        grid = grid.apply_edit(GridEdit::Width(w), lock);
    }
    if let Some(h) = blocks_high {
        grid = grid.apply_edit(GridEdit::Height(h), lock);
    }
    grid.validate()?;
    Ok(grid)
}

fn default_output_path(input_path: &Path, format: OutputFormat) -> PathBuf {
    let file_stem = input_path.file_stem().unwrap_or_default();
    let mut new_name = file_stem.to_os_string();
    new_name.push(format!("_pixelized.{}", format.extension()));
    input_path.with_file_name(new_name)
}

fn parse_size(size_str: &str) -> Result<(u32, u32), &'static str> {
    let parts: Vec<&str> = size_str.split(',').collect();
    if parts.len() != 2 {
        return Err("Provide size in the format w,h.");
    }

    let w = parts[0].trim().parse::<u32>().map_err(|_| "Invalid width.")?;
    let h = parts[1].trim().parse::<u32>().map_err(|_| "Invalid height.")?;

    match (w, h) {
        (0, _) => Err("Width is zero."),
        (_, 0) => Err("Height is zero."),
        _ => Ok((w, h)),
    }
}
