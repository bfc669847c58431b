// ABOUTME: Demonstration CLI that binds to an SMSC, submits one message and
// ABOUTME: waits for the responses before unbinding cleanly

use argh::FromArgs;

use smpp_esme::{BindCredentials, Client, ClientConfig, CommandId, SmsMessage};

#[derive(FromArgs)]
/// Send one SMS through an SMSC over SMPP 3.4.
struct Args {
    /// SMSC host name or address
    #[argh(option, default = "String::from(\"localhost\")")]
    host: String,

    /// SMSC port
    #[argh(option, default = "2775")]
    port: u16,

    /// system_id used for the bind
    #[argh(option)]
    system_id: String,

    /// password used for the bind
    #[argh(option)]
    password: String,

    /// destination address
    #[argh(option)]
    to: String,

    /// source address
    #[argh(option)]
    from: String,

    /// message text
    #[argh(positional)]
    text: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smpp_esme=debug".into()),
        )
        .init();

    let args: Args = argh::from_env();

    let mut esme = Client::new(ClientConfig::new(args.host, args.port));
    esme.set_callbacks(smpp_esme::Callbacks::new().on(CommandId::SubmitSmResp, |pdu| {
        if pdu.ok() {
            println!(
                "message accepted, id {:?}",
                pdu.str_value("message_id").unwrap_or("")
            );
        } else {
            eprintln!("submit rejected, status {:#010x}", pdu.command_status);
        }
        None
    }));

    esme.connect().await?;
    esme.bind_transceiver(&BindCredentials::new(args.system_id, args.password))
        .await?;

    let message = SmsMessage::new(args.to, args.from, args.text);
    let sequences = esme.submit_message(&message).await?;

    // one response per submitted part
    for _ in &sequences {
        esme.read_one_pdu().await?;
    }

    esme.unbind().await?;
    esme.listen().await?;
    Ok(())
}
