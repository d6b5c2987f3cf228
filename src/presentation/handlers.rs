// Bot command handlers
use crate::application::chat_client::ChartImage;
use crate::application::consumption_service::MeterReport;
use crate::domain::error::MeterError;
use crate::presentation::app_state::AppState;
use crate::presentation::{charts, report};

/// Handle `/get_consumption`: fetch every meter, then send one text summary
/// and its charts per meter. Requests from any chat other than the
/// authorized one only produce a warning in the administrator chat.
pub async fn get_consumption(state: &AppState, chat_id: i64) -> Result<(), MeterError> {
    if chat_id != state.authorized_chat_id {
        tracing::warn!("Unauthorized chat_id={}", chat_id);
        notify(state, state.admin_chat_id, &report::unauthorized_warning(chat_id)).await;
        return Err(MeterError::Unauthorized { chat_id });
    }

    tracing::info!("get_consumption command received, chat_id={}", chat_id);
    notify(state, chat_id, report::CONNECTING).await;

    let fetched = match state.consumption_service.fetch_all_meters().await {
        Ok(fetched) => fetched,
        Err(e) => {
            tracing::error!("Fetching meter data failed: {}", e);
            notify(state, chat_id, &report::fetch_failed_text(&e)).await;
            return Err(e);
        }
    };

    if fetched.is_empty() {
        notify(state, chat_id, report::NO_METERS).await;
    }

    for fetch in fetched {
        let meter_report = state.consumption_service.analyze(fetch);
        send_report(state, chat_id, meter_report).await;
    }

    Ok(())
}

async fn send_report(state: &AppState, chat_id: i64, meter_report: MeterReport) {
    let (width, height) = (state.chart_width, state.chart_height);

    match meter_report {
        MeterReport::Complete { summary, samples } => {
            notify(state, chat_id, &report::summary_text(&summary)).await;

            let stem = summary.meter.file_stem();
            send_chart(
                state,
                chat_id,
                format!("{stem}-power-history.svg"),
                charts::power_history_svg(&summary.meter, &samples, width, height),
            )
            .await;
            send_chart(
                state,
                chat_id,
                format!("{stem}-daily-energy.svg"),
                charts::daily_energy_svg(&summary.meter, &samples, width, height),
            )
            .await;
        }
        MeterReport::SingleDay {
            meter,
            last_day,
            samples,
        } => {
            tracing::info!(
                "Meter {} has a single day of data, skipping projection",
                meter.meter_id
            );
            notify(state, chat_id, &report::single_day_text(&meter, &last_day)).await;
            send_chart(
                state,
                chat_id,
                format!("{}-power-last-day.svg", meter.file_stem()),
                charts::power_last_day_svg(&meter, &samples, width, height),
            )
            .await;
        }
        MeterReport::Failed { meter, error } => {
            tracing::warn!(
                "Meter {} of installation {} skipped: {}",
                meter.meter_id,
                meter.installation_id,
                error
            );
            notify(state, chat_id, &report::failure_text(&meter, &error)).await;
        }
    }
}

async fn send_chart(
    state: &AppState,
    chat_id: i64,
    file_name: String,
    rendered: anyhow::Result<String>,
) {
    match rendered {
        Ok(svg) => {
            if let Err(e) = state
                .chat
                .send_image(chat_id, ChartImage::svg(file_name.clone(), svg))
                .await
            {
                tracing::warn!(
                    "Sending chart {} to chat {} failed: {:#}",
                    file_name,
                    chat_id,
                    e
                );
            }
        }
        Err(e) => {
            tracing::error!("Rendering chart {} failed: {:#}", file_name, e);
            notify(state, chat_id, &report::chart_failed_text(&file_name)).await;
        }
    }
}

/// Send a text, logging instead of failing when delivery does not work out
async fn notify(state: &AppState, chat_id: i64, text: &str) {
    if let Err(e) = state.chat.send_text(chat_id, text).await {
        tracing::warn!("Sending message to chat {} failed: {:#}", chat_id, e);
    }
}
