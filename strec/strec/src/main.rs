#[cfg(feature = "cli")]
fn main() {
    std::process::exit(strec::cli::main());
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("strec was built without the `cli` feature");
}
