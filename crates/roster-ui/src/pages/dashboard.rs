use leptos::prelude::*;

use crate::components::cards::{ChartCard, SummaryCard};
use crate::components::chart::{BarChart, PieChart};

const SUMMARY: &[(&str, &str, &str)] = &[
    ("Students", "1,230", "\u{263A}"),
    ("Subjects", "54", "\u{2630}"),
    ("Teachers", "67", "\u{2691}"),
    ("Reports", "128", "\u{2637}"),
];

const MONTHLY_ENROLLMENTS: &[(&str, f32)] =
    &[("Jan", 120.0), ("Feb", 190.0), ("Mar", 300.0), ("Apr", 250.0)];

const GENDER_DISTRIBUTION: &[(&str, f32)] = &[("Male", 700.0), ("Female", 530.0)];

#[component]
pub fn DashboardPage() -> impl IntoView {
    view! {
        <div class="dashboard-header">
            <h1>"Dashboard"</h1>
            <p class="subtitle">"School overview"</p>
        </div>

        <div class="summary-grid">
            {SUMMARY
                .iter()
                .map(|&(label, value, icon)| {
                    view! { <SummaryCard label=label value=value icon=icon /> }
                })
                .collect_view()}
        </div>

        <div class="dashboard-grid">
            <ChartCard heading="Monthly Enrollments" caption="New students, January to April">
                <BarChart points=MONTHLY_ENROLLMENTS.to_vec() />
            </ChartCard>
            <ChartCard heading="Gender Distribution" caption="All enrolled students">
                <PieChart slices=GENDER_DISTRIBUTION.to_vec() />
            </ChartCard>
        </div>
    }
}
