mod app;
mod sites;
mod util;

use std::path::PathBuf;

use clap::Parser;

use sites::{SortDirection, SortKey};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file of ring members: [{name, url, program, year}, ...]
    #[arg(long, default_value = "sites.json")]
    sites: PathBuf,

    /// Initial sort key: name, program or year
    #[arg(long, default_value = "name")]
    sort: String,

    /// Sort descending instead of ascending
    #[arg(long)]
    descending: bool,
}

fn parse_sort_key(raw: &str) -> SortKey {
    match raw.to_ascii_lowercase().as_str() {
        "program" => SortKey::Program,
        "year" => SortKey::Year,
        "name" => SortKey::Name,
        other => {
            log::warn!("unknown sort key '{other}', falling back to name");
            SortKey::Name
        }
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let sort_key = parse_sort_key(&args.sort);
    let sort_direction = if args.descending {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "webring-atlas",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::AtlasApp::new(
                cc,
                args.sites.clone(),
                sort_key,
                sort_direction,
            )))
        }),
    )
}
