use std::path::PathBuf;

use clap::Parser;
use log::info;
use rs_charlm_core::io::read_corpus;
use rs_charlm_core::model::ModelConfig;

#[derive(Parser, Debug)]
#[command(about = "Trains a character-level n-gram model and generates text from it.")]
struct Args {
	/// Training corpora, learned in order (counts accumulate)
	#[arg(long, required = true)]
	corpus: Vec<PathBuf>,

	/// Number of characters in a context window
	#[arg(long, default_value = "3")]
	window: usize,

	/// Seed of the random source; omit for a different text on every run
	#[arg(long)]
	seed: Option<u64>,

	/// Text to start from. Defaults to the first `window` characters of the first corpus
	#[arg(long)]
	initial: Option<String>,

	/// Maximum number of characters to append
	#[arg(long, default_value = "500")]
	length: usize,

	/// Number of texts to generate
	#[arg(long, default_value = "1")]
	count: usize,

	/// Print the learned windows and their follower tables
	#[arg(long)]
	dump: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::init();
	let args = Args::parse();

	let mut model = ModelConfig::new(args.window, args.seed).build()?;

	let mut first_corpus = None;
	for path in &args.corpus {
		let corpus = read_corpus(path)?;
		info!("training on {} ({} chars)", path.display(), corpus.chars().count());
		model.train(&corpus);
		first_corpus.get_or_insert(corpus);
	}
	info!("model holds {} windows", model.len());

	if args.dump {
		print!("{}", model);
	}

	let initial = match args.initial {
		Some(initial) => initial,
		None => first_corpus
			.unwrap_or_default()
			.chars()
			.take(args.window)
			.collect(),
	};

	for _ in 0..args.count {
		println!("{}", model.generate(&initial, args.length));
	}

	Ok(())
}
