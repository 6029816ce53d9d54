// Terminal front end for the survey dashboard
use clap::{Parser, Subcommand};
use log::error;
use std::process::ExitCode;

use surveyforge_service::client::{connect, DataSourceKind};
use surveyforge_service::config::ClientConfig;
use surveyforge_service::dashboard::render::{render, render_questions, render_survey};
use surveyforge_service::dashboard::{ApproveForm, CreateSurveyForm, Dashboard, SortKey, StatusFilter, View};

#[derive(Parser)]
#[command(name = "surveyforge-dashboard", about = "Create, review and approve surveys")]
struct Cli {
    /// Data source for this session: live, demo or auto
    #[arg(long)]
    source: Option<DataSourceKind>,

    /// Backend base URL (defaults to NEXT_PUBLIC_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Email used for a local sign-in when the backend has no session
    #[arg(long, default_value = "operator@localhost")]
    user_email: String,

    /// Display name used for a local sign-in
    #[arg(long, default_value = "Operator")]
    user_name: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the dashboard: stats and one page of surveys
    List {
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long, default_value = "recent")]
        sort: SortKey,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        per_page: usize,
    },
    /// Show one survey
    Show { id: String },
    /// Create a draft survey
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// One question; repeat for more
        #[arg(long = "question")]
        questions: Vec<String>,
        /// One candidate email; repeat for more
        #[arg(long = "email")]
        emails: Vec<String>,
        /// Print the questions as form fields instead of creating the survey
        #[arg(long)]
        preview: bool,
    },
    /// Approve a survey and name the recipient
    Approve {
        id: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Delete a survey
    Delete { id: String },
    /// Show who this session is signed in as
    Whoami,
    /// Sign in with a Google ID token
    Login {
        #[arg(long)]
        token: String,
    },
    /// End the backend session
    Logout,
}

fn print_toasts(dashboard: &mut Dashboard) -> bool {
    let mut failed = false;
    for toast in dashboard.take_toasts() {
        println!("{}: {}", toast.title, toast.description);
        failed |= toast.kind == surveyforge_service::dashboard::ToastKind::Error;
    }
    failed
}

async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = ClientConfig::from_env()?;
    if let Some(source) = cli.source {
        config.data_source = source;
    }
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url.trim_end_matches('/').to_string();
    }

    let source = connect(&config).await?;
    let mut dashboard = Dashboard::new(source);
    dashboard.start(config.auth_timeout).await;

    match &cli.command {
        Command::Login { token } => {
            dashboard.login_with_google(token).await?;
            if let Some(user) = dashboard.auth().user() {
                println!("Signed in as {} <{}>", user.name, user.email);
            }
            return Ok(true);
        }
        Command::Logout => {
            dashboard.logout().await;
            println!("Signed out");
            return Ok(true);
        }
        _ => {}
    }

    if dashboard.view() == View::Landing {
        dashboard.login_local(&cli.user_email, &cli.user_name, None).await;
    }

    match cli.command {
        Command::List {
            status,
            sort,
            page,
            per_page,
        } => {
            dashboard.set_items_per_page(per_page);
            dashboard.set_filter(status);
            dashboard.set_sort(sort);
            dashboard.go_to_page(page);
            print!("{}", render(&dashboard));
            Ok(dashboard.error().is_none())
        }
        Command::Show { id } => {
            let survey = dashboard.survey_details(&id).await?;
            print!("{}", render_survey(&survey));
            Ok(true)
        }
        Command::Create {
            title,
            description,
            questions,
            emails,
            preview,
        } => {
            let form = CreateSurveyForm {
                title,
                description,
                candidate_emails: emails.join("\n"),
                questions: questions.join("\n"),
            };
            if preview {
                print!("{}", render_questions(&form.title, &form.preview()?));
                return Ok(true);
            }
            dashboard.create_survey(&form).await?;
            Ok(!print_toasts(&mut dashboard))
        }
        Command::Approve { id, email, message } => {
            let form = ApproveForm {
                recipient_email: email,
                custom_message: message,
            };
            dashboard.approve_survey(&id, &form).await?;
            Ok(!print_toasts(&mut dashboard))
        }
        Command::Delete { id } => {
            dashboard.delete_survey(&id).await;
            Ok(!print_toasts(&mut dashboard))
        }
        Command::Whoami => {
            if let Some(user) = dashboard.auth().user() {
                println!("{} <{}> ({} data)", user.name, user.email, dashboard.source_name());
            }
            Ok(true)
        }
        Command::Login { .. } | Command::Logout => Ok(true),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
