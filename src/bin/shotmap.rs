use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process;

use anyhow::bail;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, error, info};

use shotmap::layout::DrawInstruction;
use shotmap::print::{tabulate_shots, tabulate_stats};
use shotmap::provider::{PlayerId, Understat};
use shotmap::render::{Fonts, RenderConfig};
use shotmap::request;
use shotmap::request::{LabelRow, LoadedShots, Source, DEFAULT_PLAYER_LABEL};
use shotmap::season::Season;
use shotmap::stats::SummaryStats;

const COMPARISON_FALLBACK_LABELS: [&str; 2] = ["Player1", "Player2"];

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// directory to write exported files to
    #[clap(short = 'o', long, default_value = ".")]
    out: PathBuf,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if !self.out.is_dir() {
            bail!("output directory {} does not exist", self.out.display());
        }
        match &self.command {
            Command::Fetch(fetch) => fetch.source.to_source().map(drop),
            Command::Render(render) => render.source.to_source().map(drop),
            Command::Compare(compare) => compare.to_sources().map(drop),
        }
    }
}

#[derive(Debug, clap::Subcommand, Clone)]
enum Command {
    /// tabulate a player's shots and summary statistics, optionally exporting them as CSV
    Fetch(FetchArgs),

    /// render a player's shot map
    Render(RenderArgs),

    /// render two players' shot maps facing each other
    Compare(CompareArgs),
}

#[derive(Debug, clap::Args, Clone)]
struct SourceArgs {
    /// file to source the shot data from
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// download shot data by Understat player ID
    #[clap(short = 'd', long)]
    download: Option<PlayerId>,

    /// season to download
    #[clap(short = 's', long)]
    season: Option<Season>,
}
impl SourceArgs {
    fn to_source(&self) -> anyhow::Result<Source> {
        to_source(&self.file, &self.download, &self.season, "")
    }
}

fn to_source(file: &Option<PathBuf>, download: &Option<PlayerId>, season: &Option<Season>, suffix: &str) -> anyhow::Result<Source> {
    match (file, download, season) {
        (Some(file), None, None) => Ok(Source::File(file.clone())),
        (None, Some(player_id), Some(season)) => Ok(Source::Download {
            player_id: player_id.clone(),
            season: *season,
        }),
        (None, Some(_), None) => bail!("the -s{suffix} flag must accompany -d{suffix}"),
        (_, None, Some(_)) => bail!("the -s{suffix} flag only applies to downloads"),
        _ => bail!("either the -f{suffix} or the -d{suffix} flag must be specified"),
    }
}

#[derive(Debug, clap::Args, Clone)]
struct FetchArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// export the shots as CSV
    #[clap(short = 'c', long)]
    csv: bool,
}

#[derive(Debug, clap::Args, Clone)]
struct CanvasArgs {
    /// TTF/OTF font for text; text is omitted without one
    #[clap(long)]
    font: Option<PathBuf>,

    /// font for bold text; defaults to --font
    #[clap(long)]
    bold_font: Option<PathBuf>,

    /// also write the draw instructions as JSON to this file
    #[clap(long)]
    dump: Option<PathBuf>,
}
impl CanvasArgs {
    fn load_fonts(&self) -> anyhow::Result<Option<Fonts>> {
        let fonts = self
            .font
            .as_ref()
            .map(|font| Fonts::load(font, self.bold_font.as_deref()))
            .transpose()?;
        Ok(fonts)
    }
}

#[derive(Debug, clap::Args, Clone)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    canvas: CanvasArgs,
}

#[derive(Debug, clap::Args, Clone)]
struct CompareArgs {
    /// file to source the first player's shot data from
    #[clap(long)]
    file1: Option<PathBuf>,

    /// download the first player's shot data by Understat player ID
    #[clap(long)]
    download1: Option<PlayerId>,

    /// season to download for the first player
    #[clap(long)]
    season1: Option<Season>,

    /// file to source the second player's shot data from
    #[clap(long)]
    file2: Option<PathBuf>,

    /// download the second player's shot data by Understat player ID
    #[clap(long)]
    download2: Option<PlayerId>,

    /// season to download for the second player
    #[clap(long)]
    season2: Option<Season>,

    #[command(flatten)]
    canvas: CanvasArgs,
}
impl CompareArgs {
    fn to_sources(&self) -> anyhow::Result<[Source; 2]> {
        Ok([
            to_source(&self.file1, &self.download1, &self.season1, "1")?,
            to_source(&self.file2, &self.download2, &self.season2, "2")?,
        ])
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    if let Err(err) = run(&args).await {
        error!("{err:#}");
        process::exit(1);
    }
    Ok(())
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let provider = Understat::default();
    match &args.command {
        Command::Fetch(fetch) => {
            let loaded = request::load(&provider, &fetch.source.to_source()?, DEFAULT_PLAYER_LABEL, LabelRow::FirstOverall).await?;
            info!("\n{}", Console::default().render(&tabulate_shots(&loaded.table)));
            let derivation = loaded.derive()?;
            print_stats(&[(&loaded, &derivation.stats)]);
            if fetch.csv {
                request::export_csv(&loaded, &args.out)?;
            }
        }
        Command::Render(render) => {
            let fonts = render.canvas.load_fonts()?;
            let loaded = request::load(&provider, &render.source.to_source()?, DEFAULT_PLAYER_LABEL, LabelRow::FirstInSeason).await?;
            let map = request::single_map(&loaded)?;
            print_stats(&[(&loaded, &map.derivation.stats)]);
            dump(&render.canvas, &map.instructions)?;
            let path = args.out.join(loaded.png_file_name());
            request::export_png(&map.instructions, &RenderConfig::default(), fonts.as_ref(), &path)?;
        }
        Command::Compare(compare) => {
            let fonts = compare.canvas.load_fonts()?;
            let [top_source, bottom_source] = compare.to_sources()?;
            let [top_label, bottom_label] = COMPARISON_FALLBACK_LABELS;
            let top = request::load(&provider, &top_source, top_label, LabelRow::FirstInSeason).await?;
            let bottom = request::load(&provider, &bottom_source, bottom_label, LabelRow::FirstInSeason).await?;
            let (instructions, [top_derivation, bottom_derivation]) = request::comparison_map(&top, &bottom)?;
            print_stats(&[(&top, &top_derivation.stats), (&bottom, &bottom_derivation.stats)]);
            dump(&compare.canvas, &instructions)?;
            let path = args.out.join(request::comparison_png_file_name(&top, &bottom));
            request::export_png(&instructions, &RenderConfig::default(), fonts.as_ref(), &path)?;
        }
    }
    Ok(())
}

fn print_stats(subjects: &[(&LoadedShots, &SummaryStats)]) {
    let labelled = subjects
        .iter()
        .map(|(loaded, stats)| (format!("{} {}", loaded.player_label, loaded.season_label), *stats))
        .collect::<Vec<_>>();
    let columns = labelled
        .iter()
        .map(|(label, stats)| (label.as_str(), *stats))
        .collect::<Vec<_>>();
    info!("\n{}", Console::default().render(&tabulate_stats(&columns)));
}

fn dump(canvas: &CanvasArgs, instructions: &[DrawInstruction]) -> anyhow::Result<()> {
    if let Some(path) = &canvas.dump {
        request::dump_instructions(instructions, path)?;
    }
    Ok(())
}
