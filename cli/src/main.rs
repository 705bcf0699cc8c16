//! slicepdf CLI - paginate rendered blocks into a PDF

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use slicepdf::{
    CutOptions, ImageRasterizer, ImageSource, Language, PaginateOptions, Paginator, Rasterizer,
    SafeCutFinder,
};

#[derive(Parser)]
#[command(name = "slicepdf")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Pack rendered content blocks into fixed-size PDF pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Paginate image files (PNG/JPEG) into a PDF
    Paginate(PaginateArgs),

    /// Show where an image would be cut for a given height
    Inspect {
        /// Input image
        #[arg(value_name = "IMAGE")]
        input: PathBuf,

        /// Space available, in nominal pixels
        #[arg(long, value_name = "N")]
        max_height: f32,

        /// Supersampling factor the image was rendered at
        #[arg(long, default_value = "2")]
        sample_scale: f32,

        /// Treat rows with only thin borders as blank
        #[arg(long)]
        tolerant: bool,

        /// Write the head and tail slices as PNG files into this directory
        #[arg(long, value_name = "DIR")]
        dump: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct PaginateArgs {
    /// Rendered blocks, in document order
    #[arg(value_name = "IMAGES", required = true)]
    inputs: Vec<PathBuf>,

    /// Output PDF (defaults to questions-<lang>.pdf)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Document language
    #[arg(long, value_enum)]
    lang: Option<Lang>,

    /// Title drawn at the top of the first page (WinAnsi characters only)
    #[arg(long)]
    title: Option<String>,

    /// Page margin in points
    #[arg(long)]
    margin: Option<f32>,

    /// Page width in points
    #[arg(long)]
    page_width: Option<f32>,

    /// Page height in points
    #[arg(long)]
    page_height: Option<f32>,

    /// Supersampling factor the images were rendered at
    #[arg(long)]
    sample_scale: Option<f32>,

    /// Vertical gap between blocks in points
    #[arg(long)]
    gap: Option<f32>,

    /// Space kept free for the title on the first page, in points (default 50)
    #[arg(long)]
    title_reserve: Option<f32>,

    /// Treat rows with only thin borders as blank
    #[arg(long)]
    tolerant: bool,

    /// Do not print page numbers
    #[arg(long)]
    no_page_numbers: bool,

    /// Load options from a JSON file (flags override it)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write a JSON layout report
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Lang {
    /// English
    En,
    /// Korean
    Ko,
}

impl From<Lang> for Language {
    fn from(lang: Lang) -> Self {
        match lang {
            Lang::En => Language::English,
            Lang::Ko => Language::Korean,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Paginate(args) => cmd_paginate(&args),
        Commands::Inspect {
            input,
            max_height,
            sample_scale,
            tolerant,
            dump,
        } => cmd_inspect(&input, max_height, sample_scale, tolerant, dump.as_deref()),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Merge the config file (if any) with command-line flags.
fn build_options(args: &PaginateArgs) -> Result<PaginateOptions, Box<dyn std::error::Error>> {
    let mut options = match args.config {
        Some(ref path) => {
            let json = fs::read_to_string(path)?;
            serde_json::from_str::<PaginateOptions>(&json)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?
        }
        None => PaginateOptions::default(),
    };

    if let Some(lang) = args.lang {
        options = options.with_language(lang.into());
    }
    if let Some(ref title) = args.title {
        options = options.with_title(title.clone());
    }
    if let Some(margin) = args.margin {
        options = options.with_margin(margin);
    }
    if args.page_width.is_some() || args.page_height.is_some() {
        let width = args.page_width.unwrap_or(options.geometry.page_width);
        let height = args.page_height.unwrap_or(options.geometry.page_height);
        options = options.with_page_size(width, height);
    }
    if let Some(scale) = args.sample_scale {
        options = options.with_sample_scale(scale);
    }
    if let Some(gap) = args.gap {
        options = options.with_block_gap(gap);
    }
    if let Some(reserve) = args.title_reserve {
        options = options.with_title_reserve(reserve);
    }
    if args.tolerant {
        let cut = options.cut.tolerant();
        options = options.with_cut_options(cut);
    }
    if args.no_page_numbers {
        options = options.with_page_numbers(false);
    }

    options.validate()?;
    log::debug!("paginate options: {:?}", options);
    Ok(options)
}

fn cmd_paginate(args: &PaginateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = build_options(args)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(options.language.file_name()));
    let blocks: Vec<ImageSource> = args.inputs.iter().map(|p| p.as_path().into()).collect();

    let pb = ProgressBar::new(blocks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message("Paginating...");

    let doc = {
        let mut paginator =
            Paginator::new(options)?.on_progress(|p| pb.set_position(p.processed as u64));
        paginator.paginate(&blocks, &mut ImageRasterizer::new())?
    };

    pb.set_message("Writing PDF...");
    doc.save(&output)?;
    pb.finish_with_message("Done!");

    if let Some(ref path) = args.report {
        let json = serde_json::to_string_pretty(&doc.layout_report())?;
        fs::write(path, json)?;
    }

    println!(
        "\n{} {} ({} blocks, {} pages)",
        "Saved to".green(),
        output.display(),
        blocks.len(),
        doc.page_count()
    );
    if let Some(ref path) = args.report {
        println!("{} {}", "Layout report:".green(), path.display());
    }

    Ok(())
}

fn cmd_inspect(
    input: &Path,
    max_height: f32,
    sample_scale: f32,
    tolerant: bool,
    dump: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !(max_height.is_finite() && max_height >= 0.0) {
        return Err(format!("Invalid max height: {}", max_height).into());
    }

    let bitmap = ImageRasterizer::new()
        .rasterize(&ImageSource::from(input), sample_scale)
        .map_err(|e| format!("{}: {}", input.display(), e))?;

    let cut_options = if tolerant {
        CutOptions::new().tolerant()
    } else {
        CutOptions::new()
    };
    let finder = SafeCutFinder::new(cut_options);
    let max_rows = ((max_height * sample_scale) as u32).min(bitmap.height());
    let cut = finder.find_cut(&bitmap, max_rows);

    println!("{}", "Cut Inspection".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!(
        "{}: {}x{} px (scale {})",
        "Bitmap".bold(),
        bitmap.width(),
        bitmap.height(),
        sample_scale
    );
    println!("{}: {} rows", "Limit".bold(), max_rows);

    if bitmap.height() <= max_rows {
        println!("{}: fits without a cut", "Result".bold());
        return Ok(());
    }
    if cut == 0 {
        println!(
            "{}: {}",
            "Result".bold(),
            "no blank band, would hard cut or move to the next page".yellow()
        );
        return Ok(());
    }

    println!("{}: row {}", "Cut".bold(), cut);
    println!("{}: {} rows", "Head".bold(), cut);
    println!("{}: {} rows", "Tail".bold(), bitmap.height() - cut);

    if let Some(dir) = dump {
        fs::create_dir_all(dir)?;
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        for (name, rows) in [("head", 0..cut), ("tail", cut..bitmap.height())] {
            let Some(slice) = bitmap.crop_rows(rows) else {
                continue;
            };
            let path = dir.join(format!("{}_{}.png", stem, name));
            image::save_buffer(
                &path,
                slice.pixels(),
                slice.width(),
                slice.height(),
                image::ExtendedColorType::Rgba8,
            )?;
            println!("{} {}", "Wrote".green(), path.display());
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "slicepdf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Content-aware paginator for rendered blocks");
    println!();
    println!(
        "Repository: {}",
        "https://github.com/iyulab/slicepdf".dimmed()
    );
    println!("License: MIT");
}
