use std::path::PathBuf;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, post, put, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use log::info;
use serde::Deserialize;

use rs_charlm_core::LmError;
use rs_charlm_core::io::{list_files, normalize_folder};
use rs_charlm_core::model::{GenerateParams, LanguageModel, ModelConfig};

#[derive(Parser, Debug)]
#[command(about = "Serves a character-level n-gram model over HTTP.")]
struct Args {
	/// Address to bind
	#[arg(long, default_value = "127.0.0.1")]
	bind: String,

	/// Port to listen on
	#[arg(long, default_value = "5000")]
	port: u16,

	/// Directory holding the `.txt` corpora
	#[arg(long, default_value = "./data")]
	data: String,

	/// Number of characters in a context window
	#[arg(long, default_value = "3")]
	window: usize,

	/// Seed of the random source; omit for non-reproducible output
	#[arg(long)]
	seed: Option<u64>,
}

#[derive(Deserialize)]
struct CorpusQuery {
	names: Option<String>,
}

#[derive(Deserialize)]
struct TableQuery {
	window: String,
}

/// Model and data directory, shared by all workers behind one lock.
///
/// Training, generation and reset all take the same lock, so draws from a
/// seeded model happen in request order.
struct SharedData {
	model: LanguageModel,
	data_dir: PathBuf,
}

type Shared = web::Data<Mutex<SharedData>>;

fn error_response(e: &LmError) -> HttpResponse {
	match e {
		LmError::InvalidArgument { .. } | LmError::OutOfRange { .. } => {
			HttpResponse::BadRequest().body(e.to_string())
		}
		LmError::ResourceUnavailable { .. } => HttpResponse::NotFound().body(e.to_string()),
	}
}

macro_rules! lock_or_500 {
	($data:expr) => {
		match $data.lock() {
			Ok(m) => m,
			Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
		}
	};
}

/// Endpoint: GET /v1/generate
///
/// Extends `initial_text` by up to `length` characters.
#[get("/v1/generate")]
async fn get_generated(data: Shared, query: web::Query<GenerateParams>) -> impl Responder {
	let mut shared_data = lock_or_500!(data);
	HttpResponse::Ok().body(query.apply(&mut shared_data.model))
}

/// Endpoint: PUT /v1/train?names=a,b
///
/// Trains on `<data>/<name>.txt` for every listed name, in order.
#[put("/v1/train")]
async fn put_train(data: Shared, query: web::Query<CorpusQuery>) -> impl Responder {
	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};

	let mut shared_data = lock_or_500!(data);
	let SharedData { model, data_dir } = &mut *shared_data;

	for name in query_names.split(',').map(str::trim).filter(|s| !s.is_empty()) {
		if let Err(e) = model.train_file(data_dir.join(format!("{}.txt", name))) {
			return error_response(&e);
		}
		info!("trained on corpus {}", name);
	}

	HttpResponse::Ok().body(format!("Model holds {} windows", model.len()))
}

/// Endpoint: POST /v1/train
///
/// Trains on the raw request body.
#[post("/v1/train")]
async fn post_train(data: Shared, body: String) -> impl Responder {
	let mut shared_data = lock_or_500!(data);
	shared_data.model.train(&body);
	HttpResponse::Ok().body(format!("Model holds {} windows", shared_data.model.len()))
}

/// Endpoint: PUT /v1/reset?window_length=..&seed=..
///
/// Replaces the model with an empty one.
#[put("/v1/reset")]
async fn put_reset(data: Shared, query: web::Query<ModelConfig>) -> impl Responder {
	let model = match query.build() {
		Ok(model) => model,
		Err(e) => return error_response(&e),
	};
	let mut shared_data = lock_or_500!(data);
	shared_data.model = model;
	HttpResponse::Ok().body("Model reset")
}

/// Endpoint: GET /v1/model
///
/// Diagnostic rendering, one `window : table` line per window.
#[get("/v1/model")]
async fn get_model(data: Shared) -> impl Responder {
	let shared_data = lock_or_500!(data);
	HttpResponse::Ok().body(shared_data.model.to_string())
}

/// Endpoint: GET /v1/table?window=..
///
/// Follower table of one window as JSON.
#[get("/v1/table")]
async fn get_table(data: Shared, query: web::Query<TableQuery>) -> impl Responder {
	let shared_data = lock_or_500!(data);
	match shared_data.model.table(&query.window) {
		Some(table) => HttpResponse::Ok().json(table),
		None => HttpResponse::NotFound().body(format!("Unknown window {:?}", query.window)),
	}
}

/// Endpoint: GET /v1/corpora
///
/// Names of the corpora available in the data directory.
#[get("/v1/corpora")]
async fn get_corpora(data: Shared) -> impl Responder {
	let data_dir = {
		let shared_data = lock_or_500!(data);
		shared_data.data_dir.clone()
	};
	match list_files(&data_dir, "txt") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n")),
		Err(e) => error_response(&e),
	}
}

fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated)
		.service(put_train)
		.service(post_train)
		.service(put_reset)
		.service(get_model)
		.service(get_table)
		.service(get_corpora);
}

/// Main entry point for the server.
///
/// Builds the initial (empty) model, wraps it in a `Mutex`,
/// and starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
	let args = Args::parse();

	let shared_data = SharedData {
		model: ModelConfig::new(args.window, args.seed).build()?,
		data_dir: normalize_folder(&args.data),
	};
	let shared_model = web::Data::new(Mutex::new(shared_data));

	info!("listening on {}:{}", args.bind, args.port);
	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.configure(configure)
	})
		.bind((args.bind.as_str(), args.port))?
		.run()
		.await?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test;

	fn shared(window_length: usize, data_dir: PathBuf) -> Shared {
		let model = LanguageModel::with_seed(window_length, 1).unwrap();
		web::Data::new(Mutex::new(SharedData { model, data_dir }))
	}

	macro_rules! app {
		($data:expr) => {
			test::init_service(App::new().app_data($data.clone()).configure(configure)).await
		};
	}

	#[actix_web::test]
	async fn train_then_generate() {
		let data = shared(2, PathBuf::from("."));
		let app = app!(data);

		let req = test::TestRequest::post().uri("/v1/train").set_payload("abcd").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body, "Model holds 2 windows");

		let req = test::TestRequest::get()
			.uri("/v1/generate?initial_text=ab&length=10")
			.to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, "abcd");
	}

	#[actix_web::test]
	async fn train_from_data_directory() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("tiny.txt"), "aab").unwrap();
		let data = shared(1, dir.path().to_path_buf());
		let app = app!(data);

		let req = test::TestRequest::put().uri("/v1/train?names=tiny").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
		assert_eq!(data.lock().unwrap().model.table("a").unwrap().total_count(), 2);

		let req = test::TestRequest::get().uri("/v1/corpora").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, "tiny");
	}

	#[actix_web::test]
	async fn missing_corpus_is_not_found() {
		let dir = tempfile::tempdir().unwrap();
		let app = app!(shared(1, dir.path().to_path_buf()));

		let req = test::TestRequest::put().uri("/v1/train?names=nope").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

		let req = test::TestRequest::put().uri("/v1/train").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn reset_validates_window_length() {
		let data = shared(1, PathBuf::from("."));
		let app = app!(data);

		let req = test::TestRequest::put().uri("/v1/reset?window_length=0").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

		let req = test::TestRequest::put().uri("/v1/reset?window_length=4&seed=3").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
		assert_eq!(data.lock().unwrap().model.window_length(), 4);
	}

	#[actix_web::test]
	async fn model_and_table_views() {
		let data = shared(1, PathBuf::from("."));
		let app = app!(data);

		let req = test::TestRequest::post().uri("/v1/train").set_payload("ab").to_request();
		test::call_service(&app, req).await;

		let req = test::TestRequest::get().uri("/v1/model").to_request();
		assert_eq!(test::call_and_read_body(&app, req).await, "a : ((b 1 1 1))\n");

		let req = test::TestRequest::get().uri("/v1/table?window=a").to_request();
		let table: serde_json::Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(table["records"][0]["character"], "b");
		assert_eq!(table["records"][0]["count"], 1);

		let req = test::TestRequest::get().uri("/v1/table?window=z").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
	}
}
