use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher};

/// Hash a password for seeding users.password_hash by hand:
/// cargo run --bin hashpass <password>
fn main() {
    let password = std::env::args().nth(1).expect("usage: hashpass <password>");
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("argon2 hash failed");
    println!("{hash}");
}
