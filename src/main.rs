use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, bail, eyre};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use thumbloader::domain::entities::{MediaItemId, ThumbnailQuality};
use thumbloader::domain::ports::ThumbnailProvider;
use thumbloader::infrastructure::image::{ListenerId, ThumbnailEventKind, codec};
use thumbloader::infrastructure::{
    AppConfig, ChannelListener, CliArgs, Command, ConfigNotice, DynamicThumbnailProvider,
    HttpImageDownloader, LoadOptions, StorageManager, ThumbnailLoader, ThumbnailSet,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<(AppConfig, Option<ConfigNotice>)> {
    let storage = StorageManager::new()?;
    let loaded = storage.load_config(args.config.as_deref())?;
    let mut config = loaded.config;
    config.merge_with_args(args);
    Ok((config, loaded.notice))
}

fn report_config_notice(notice: Option<ConfigNotice>) {
    match notice {
        Some(ConfigNotice::CreatedDefault(path)) => {
            info!(path = %path.display(), "Config file not found, created default");
        }
        Some(ConfigNotice::Malformed { path, error }) => {
            warn!(path = %path.display(), %error, "Failed to parse config file, using defaults");
        }
        None => {}
    }
}

fn create_loader(config: &AppConfig) -> Result<ThumbnailLoader> {
    let downloader = HttpImageDownloader::new(&config.cache.downloader_config())?;
    let loader = ThumbnailLoader::new(
        &config.cache.loader_config(),
        config.cache.disk_cache(),
        Arc::new(downloader),
    );
    debug!(?loader, "Thumbnail loader ready");
    Ok(loader)
}

fn build_provider(urls: Vec<String>, template: Option<String>) -> Result<Box<dyn ThumbnailProvider>> {
    if let Some(template) = template {
        let provider = DynamicThumbnailProvider::new(template)
            .ok_or_else(|| eyre!("template must contain a {{size}} placeholder"))?;
        return Ok(Box::new(provider));
    }
    if urls.is_empty() {
        bail!("pass at least one --url or a --template");
    }
    Ok(Box::new(ThumbnailSet::from_urls(urls)))
}

fn log_load_events(loader: &ThumbnailLoader) -> (ListenerId, JoinHandle<()>) {
    let (listener, mut events) = ChannelListener::channel();
    let id = loader.add_listener(Arc::new(listener));

    // Ends once the listener is removed and the buffered events are drained.
    let handle = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event.kind {
                ThumbnailEventKind::Started => debug!(key = %event.key, "Load started"),
                ThumbnailEventKind::Finished(image) => debug!(
                    key = %event.key,
                    width = image.width(),
                    height = image.height(),
                    "Load finished"
                ),
                ThumbnailEventKind::Failed(error) => {
                    warn!(key = %event.key, error = %error, "Load failed");
                }
            }
        }
    });

    (id, handle)
}

async fn fetch(
    loader: &ThumbnailLoader,
    item: MediaItemId,
    urls: Vec<String>,
    template: Option<String>,
    quality: ThumbnailQuality,
    options: LoadOptions,
    output: Option<std::path::PathBuf>,
) -> Result<()> {
    let provider = build_provider(urls, template)?;
    let (listener_id, events) = log_load_events(loader);

    let result = loader
        .load_thumbnail_with_source(&item, quality, provider.as_ref(), options)
        .await;

    loader.remove_listener(listener_id);
    if let Err(e) = events.await {
        warn!(error = %e, "Load event logger failed");
    }

    let loaded = result?;
    println!(
        "{item} [{quality}] {}x{} from {}",
        loaded.image.width(),
        loaded.image.height(),
        loaded.source
    );

    if let Some(path) = output {
        let png = codec::encode_png(Arc::clone(&loaded.image)).await?;
        tokio::fs::write(&path, png).await?;
        println!("saved to {}", path.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let (config, notice) = load_config(&args)?;
    init_logging(&config)?;
    report_config_notice(notice);

    info!(version = thumbloader::VERSION, "Starting {}", thumbloader::NAME);

    let loader = create_loader(&config)?;

    match args.command {
        Command::Fetch {
            item_id,
            urls,
            template,
            quality,
            no_cache_read,
            no_cache_write,
            output,
        } => {
            let options = LoadOptions {
                disable_cache_read: no_cache_read,
                disable_cache_write: no_cache_write,
            };
            fetch(
                &loader,
                MediaItemId::new(item_id),
                urls,
                template,
                quality,
                options,
                output,
            )
            .await?;
        }
        Command::Invalidate { item_id } => {
            let item = MediaItemId::new(item_id);
            loader.invalidate(&item).await;
            println!("invalidated {item}");
        }
        Command::Path { item_id, quality } => {
            let item = MediaItemId::new(item_id);
            let qualities = quality.map_or_else(|| ThumbnailQuality::ALL.to_vec(), |q| vec![q]);
            for quality in qualities {
                let cached = loader.disk_cache().contains(&item, quality).await;
                println!(
                    "{quality}\t{}\t{}",
                    loader.disk_cache().path_for(&item, quality).display(),
                    if cached { "cached" } else { "missing" }
                );
            }
        }
    }

    Ok(())
}
