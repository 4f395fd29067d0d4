#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::cargo)]
#![warn(
    clippy::nursery,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::significant_drop_tightening,
    clippy::multiple_crate_versions
)]

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use csv::{Writer, WriterBuilder};
use fixed_map::{Key, Map};
use glob::GlobError;
use rayon::prelude::*;
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

use scorekeeper::game_file::GameFile;
use scorekeeper::scoring::schemas::{
    BattingLineRow, GameStateRow, LineScoreRow, PlayRow, ScorebookToVec,
};
use scorekeeper::Scorebook;

const ABOUT: &str = "Replays scored game files into play, box score and game state tables.";

struct ThreadSafeCsvWriter {
    csv: Mutex<Writer<File>>,
}

impl ThreadSafeCsvWriter {
    pub fn new(output_root: &Path, schema: OutputSchema) -> Result<Self> {
        let output_path = output_root.join(format!("{schema}.csv"));
        debug!("Creating file {}", output_path.display());
        let csv = WriterBuilder::new()
            .has_headers(true)
            .from_path(&output_path)
            .with_context(|| format!("Failed to create {}", output_path.display()))?;
        Ok(Self {
            csv: Mutex::new(csv),
        })
    }

    pub fn csv(&self) -> Result<MutexGuard<Writer<File>>> {
        self.csv
            .lock()
            .map_err(|e| anyhow!("Failed to acquire writer lock: {}", e))
    }
}

struct WriterMap {
    map: Map<OutputSchema, ThreadSafeCsvWriter>,
}

impl WriterMap {
    fn new(output_root: &Path) -> Result<Self> {
        let mut map = Map::new();
        for schema in OutputSchema::iter() {
            map.insert(schema, ThreadSafeCsvWriter::new(output_root, schema)?);
        }
        Ok(Self { map })
    }

    fn flush_all(&self) -> Result<()> {
        for (schema, writer) in self.map.iter() {
            writer
                .csv()?
                .flush()
                .with_context(|| format!("Failed to flush {schema}"))?;
        }
        Ok(())
    }

    fn write_csv<'a, C: ScorebookToVec<'a> + Serialize>(
        &self,
        schema: OutputSchema,
        game_id: &'a str,
        book: &'a Scorebook,
    ) -> Result<()> {
        let writer = self
            .map
            .get(schema)
            .context("Failed to initialize writer for schema")?;
        let rows = C::from_scorebook(game_id, book)?;
        let mut csv = writer.csv()?;
        for row in rows {
            csv.serialize(row)?;
        }
        Ok(())
    }

    fn write_game(&self, game_id: &str, book: &Scorebook) -> Result<()> {
        self.write_csv::<PlayRow>(OutputSchema::Plays, game_id, book)?;
        self.write_csv::<BattingLineRow>(OutputSchema::BattingLines, game_id, book)?;
        self.write_csv::<LineScoreRow>(OutputSchema::LineScores, game_id, book)?;
        self.write_csv::<GameStateRow>(OutputSchema::GameStates, game_id, book)?;
        Ok(())
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone, Ord, PartialOrd, Hash, Display, EnumIter, Key)]
#[strum(serialize_all = "snake_case")]
enum OutputSchema {
    Plays,
    BattingLines,
    LineScores,
    GameStates,
}

#[derive(Parser, Debug)]
#[command(name = "scorekeeper", about = ABOUT)]
struct Opt {
    /// Glob matching the JSON game files to replay
    #[arg(short, long)]
    input: String,

    #[arg(short, long)]
    output_dir: PathBuf,

    #[arg(short, long)]
    verbose: bool,
}

fn get_output_root(opt: &Opt) -> Result<PathBuf> {
    std::fs::create_dir_all(&opt.output_dir).context("Error occurred on output dir check")?;
    opt.output_dir
        .canonicalize()
        .context("Error occurred on output dir canonicalization")
}

struct FileProcessor {
    opt: Opt,
    writers: WriterMap,
}

impl FileProcessor {
    pub fn new(opt: Opt) -> Result<Self> {
        let output_root = get_output_root(&opt)?;
        let writers = WriterMap::new(&output_root)?;
        Ok(Self { opt, writers })
    }

    /// Replays and writes every game in one file. A game that fails to
    /// replay is logged and skipped; the rest of the file still counts.
    fn process_file(&self, input_path: &Path) -> Result<usize> {
        debug!("Processing file {}", input_path.display());
        let mut written = 0;
        for game in GameFile::read_all(input_path)? {
            let book = match game.replay() {
                Ok(book) => book,
                Err(e) => {
                    error!("{:?}", e);
                    continue;
                }
            };
            self.writers.write_game(&game.game_id, &book)?;
            written += 1;
        }
        Ok(written)
    }

    pub fn process_files(&self) -> Result<()> {
        let mut files = glob::glob(&self.opt.input)
            .with_context(|| format!("Invalid input pattern {}", self.opt.input))?
            .collect::<Result<Vec<PathBuf>, GlobError>>()?;
        if files.is_empty() {
            bail!("No files match {}", self.opt.input);
        }
        files.par_sort();
        info!("Replaying {} game files", files.len());
        let games = files
            .par_iter()
            .map(|f| self.process_file(f))
            .collect::<Result<Vec<usize>>>()?;
        info!("Wrote {} games", games.iter().sum::<usize>());
        self.writers.flush_all()
    }
}

#[allow(clippy::expect_used)]
fn main() {
    let opt: Opt = Opt::parse();
    let level = if opt.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to initialize trace");

    let start = Instant::now();
    FileProcessor::new(opt)
        .and_then(|processor| processor.process_files())
        .expect("Error occurred while processing files");

    let end = start.elapsed();
    info!("Elapsed: {:?}", end);
}
