use std::env;

use hr_backend::auth::password::hash_password;

fn main() -> anyhow::Result<()> {
    let Some(password) = env::args().nth(1) else {
        eprintln!("Usage: hash_password <password>");
        std::process::exit(1);
    };
    println!("{}", hash_password(&password)?);
    Ok(())
}
