fn main() {
    gatenet::cli::run();
}
