fn main() {
    exprgate::cli::run();
}
