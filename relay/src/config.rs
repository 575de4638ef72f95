use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(from = "GPP_HOST", default = "0.0.0.0")]
    pub host: String,

    #[envconfig(from = "GPP_PORT", default = "3000")]
    pub port: u16,

    #[envconfig(from = "GPP_LOGSTASH_ENDPOINT", default = "http://localhost:5100")]
    pub logstash_endpoint: String,

    #[envconfig(from = "GPP_PRINT_SINK", default = "false")]
    pub print_sink: bool,
}

impl Config {
    pub fn bind(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
