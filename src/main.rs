use cidr_set::config::{init_logging, Settings};
use cidr_set::input::load;
use cidr_set::IpSet;
use colored::Colorize;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader};

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let settings = Settings::from_env()?;
    init_logging(&settings)?;
    log::info!("#Start main()");

    let mut set = IpSet::new();
    let files: Vec<String> = std::env::args().skip(1).collect();
    if files.is_empty() {
        load(io::stdin().lock(), "stdin", &mut set)?;
    }
    for path in &files {
        let file = File::open(path).map_err(|e| format!("{path}: {e}"))?;
        load(BufReader::new(file), path, &mut set)?;
    }

    if settings.validate {
        let violations = set.validate();
        for violation in &violations {
            log::error!("{} {violation}", "invalid".red());
        }
        if !violations.is_empty() {
            return Err(format!("{} broken invariants", violations.len()).into());
        }
        log::info!("{} {} blocks", "valid".green(), set.len());
    }

    for net in &set {
        println!("{net}");
    }
    println!("# {} blocks, {} addresses", set.len(), set.size());
    if settings.address_limit > 0 {
        for ip in set.get_ips(settings.address_limit) {
            println!("{ip}");
        }
    }

    Ok(())
}
