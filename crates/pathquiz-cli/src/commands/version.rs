//! Version command implementation.

use pathquiz_kernel::snapshot::SNAPSHOT_VERSION;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() {
    println!("pathquiz {VERSION}");
    println!();
    println!("Deterministic quiz sessions for pathology review.");
    println!();
    println!("Build info:");
    println!("  Snapshot format: v{SNAPSHOT_VERSION}");
    println!("  Target:          {}", std::env::consts::ARCH);
    println!("  OS:              {}", std::env::consts::OS);
}
