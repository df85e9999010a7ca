fn main() {
    points_import::cli::run();
}
