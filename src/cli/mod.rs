use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Interactive terminal chat (the default)
    Chat,

    /// Send a single prompt and print the reply
    Ask {
        /// Prompt text; multiple words are joined with spaces
        #[arg(required = true)]
        prompt: Vec<String>,
    },

    /// Serve POST /chat over HTTP for other front ends
    Serve {
        #[arg(long, default_value = "8000")]
        port: u16,

        /// Bind to 0.0.0.0 instead of 127.0.0.1, exposing the server on all network interfaces
        #[arg(long)]
        public: bool,
    },
}
