use anyhow::Result;
use closure_core::config::Settings;

pub fn run(host: &str, port: u16) -> Result<()> {
    let settings = Settings::from_env();
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(closure_server::serve(settings, host, port))
}
