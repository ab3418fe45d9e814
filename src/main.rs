use anyhow::Result;

mod app;

fn main() -> Result<()> {
    let args = verify_move::cli::parse();
    app::run(args)
}
