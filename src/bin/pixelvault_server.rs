use anyhow::{anyhow, Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::{debug, error, info, warn};
use tiny_http::{Header, Method, Request, Response, Server};

use std::io::Read;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use PixelVault::bootstrap::ensure_claim_file;
use PixelVault::consts::CLAIM_FILE;
use PixelVault::render::render_reveal_png;
use PixelVault::serve::{self, Reply};
use PixelVault::ClaimStore;

#[derive(Parser, Debug)]
#[command(
    name = "pixelvault_server",
    version,
    about = "PixelVault HTTP server (claim pixels, reveal the hidden image)"
)]
struct Opt {
    #[arg(long, default_value = "0.0.0.0:3000")]
    addr: String,
    #[arg(long, default_value = CLAIM_FILE)]
    path: PathBuf,
    /// Create a zero-filled claim file if none exists
    #[arg(long, default_value_t = false)]
    create: bool,
    /// 640x480 PNG revealed by claims
    #[arg(long)]
    secret: Option<PathBuf>,
    /// 640x480 PNG shown over unclaimed pixels
    #[arg(long)]
    cover: Option<PathBuf>,
    /// Output PNG of the partially revealed image
    #[arg(long, default_value = "output.png")]
    output: PathBuf,
    #[arg(long, default_value_t = 60)]
    render_every_secs: u64,
}

fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let opt = Opt::parse();

    if opt.create && ensure_claim_file(&opt.path)? {
        info!("created new claim file {}", opt.path.display());
    }
    let mut store = ClaimStore::open(&opt.path)
        .with_context(|| format!("open claim file {}", opt.path.display()))?;

    let server = Server::http(&opt.addr).map_err(|e| anyhow!("bind http at {}: {}", opt.addr, e))?;
    info!("pixelvault_server listening on {}", opt.addr);

    let render_every = Duration::from_secs(opt.render_every_secs.max(1));
    let mut last_render: Option<Instant> = None;
    let mut render_dirty = true;

    loop {
        if render_dirty && last_render.map_or(true, |t| t.elapsed() >= render_every) {
            if let Some(secret) = &opt.secret {
                if let Err(e) = render_reveal_png(&store, secret, opt.cover.as_deref(), &opt.output) {
                    warn!("render failed: {:#}", e);
                }
            }
            last_render = Some(Instant::now());
            render_dirty = false;
        }

        if let Some(msg) = store.take_flush_error() {
            warn!("claim file flush failed earlier: {}", msg);
        }

        let rq = match server.recv_timeout(Duration::from_secs(1)) {
            Ok(Some(rq)) => rq,
            Ok(None) => continue,
            Err(e) => {
                error!("http recv error: {}", e);
                continue;
            }
        };

        if handle(&mut store, rq) {
            render_dirty = true;
        }
    }
}

/// Returns true when a claim was saved.
fn handle(store: &mut ClaimStore, mut rq: Request) -> bool {
    let url = rq.url().to_string();
    let (route, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
    let method = rq.method().clone();
    debug!("{} {}", method, url);

    let reply = match (&method, route) {
        (Method::Get, "/" | "/health") => {
            respond(rq, Response::from_string("OK\n"));
            return false;
        }
        (Method::Get, "/metrics") => {
            let mut resp = Response::from_string(serve::build_metrics(store));
            if let Ok(ct) = Header::from_bytes(b"Content-Type", b"text/plain; version=0.0.4") {
                resp.add_header(ct);
            }
            respond(rq, resp);
            return false;
        }
        (Method::Get, "/pixel") => serve::get_pixel(store, query),
        (Method::Post, "/pixel") => {
            let mut raw = String::new();
            match rq.as_reader().read_to_string(&mut raw) {
                Ok(_) => serve::post_pixel(store, &raw),
                Err(e) => Reply::error(400, &format!("read body: {}", e)),
            }
        }
        _ => Reply::error(404, "Not Found"),
    };

    let mut resp = Response::from_string(reply.body.to_string()).with_status_code(reply.status);
    if let Ok(ct) = Header::from_bytes(b"Content-Type", b"application/json") {
        resp.add_header(ct);
    }
    respond(rq, resp);
    reply.saved
}

fn respond<R: Read>(rq: Request, resp: Response<R>) {
    if let Err(e) = rq.respond(resp) {
        warn!("respond: {}", e);
    }
}
