use leptos::prelude::*;

/// Dashboard panel holding one chart, with the period or population it
/// covers under the heading.
#[component]
pub fn ChartCard(
    heading: &'static str,
    #[prop(optional)] caption: Option<&'static str>,
    children: Children,
) -> impl IntoView {
    view! {
        <section class="card chart-card">
            <header class="chart-card-header">
                <h2 class="card-title">{heading}</h2>
                {caption.map(|text| view! { <p class="chart-card-caption">{text}</p> })}
            </header>
            {children()}
        </section>
    }
}

/// Headline count for one part of the school, e.g. "1,230 Students".
#[component]
pub fn SummaryCard(label: &'static str, value: &'static str, icon: &'static str) -> impl IntoView {
    view! {
        <div class="card summary-card">
            <span class="summary-icon">{icon}</span>
            <div>
                <div class="summary-value">{value}</div>
                <div class="summary-label">{label}</div>
            </div>
        </div>
    }
}
