use std::io::Write;
use std::sync::OnceLock;
use tempfile::NamedTempFile;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

#[allow(unused)]
pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
        }));

        let _ = FmtSubscriber::builder()
            .with_env_filter("readload=debug,readload_runtime=debug,mock_store=info")
            .try_init();
    });
}

#[allow(unused)]
pub fn key_file(keys: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("creating key file");
    for key in keys {
        writeln!(file, "{key}").expect("writing key file");
    }
    file
}
