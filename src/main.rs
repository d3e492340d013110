fn main() -> anyhow::Result<()> {
    couchctl_cli::run()
}
