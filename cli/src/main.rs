use anyhow::Result;

fn main() -> Result<()> {
    rdfexplore_cli::run()
}
