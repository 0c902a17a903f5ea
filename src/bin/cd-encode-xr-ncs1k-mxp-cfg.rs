//! Encode an NCS 1000 hardware module configuration
//!
//! Usage:
//!   cd-encode-xr-ncs1k-mxp-cfg [-v] [--print] [--format xml|json]

use clap::Parser;
use rust_netconf::models::HardwareModule;
use rust_netconf::samples::config_hardware_module;
use rust_netconf::{CodecService, CodecServiceProvider, EncodingFormat, logging};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "cd-encode-xr-ncs1k-mxp-cfg")]
#[command(version, about = "Encode configuration for model Cisco-IOS-XR-ncs1k-mxp-cfg")]
struct Args {
    /// Print debugging messages
    #[arg(short, long)]
    verbose: bool,

    /// Print the encoded configuration
    #[arg(long)]
    print: bool,

    /// Encoding format (xml or json)
    #[arg(long, default_value_t = EncodingFormat::Xml)]
    format: EncodingFormat,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);
    debug!(format = %args.format, "encoding hardware module configuration");

    let provider = CodecServiceProvider::new(args.format);
    let codec = CodecService::new();

    let mut hardware_module = HardwareModule::default();
    config_hardware_module(&mut hardware_module);

    let encoded = codec.encode(&provider, &hardware_module)?;
    if args.print {
        println!("{}", encoded);
    }

    provider.close();
    Ok(())
}
