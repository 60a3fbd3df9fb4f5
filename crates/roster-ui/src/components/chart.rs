use leptos::prelude::*;

const PALETTE: &[&str] = &["#4e79a7", "#f28e2b", "#59a14f", "#e15759", "#b07aa1"];

/// Vertical bar chart scaled to the largest value.
#[component]
pub fn BarChart(points: Vec<(&'static str, f32)>) -> impl IntoView {
    const WIDTH: f32 = 320.0;
    const HEIGHT: f32 = 180.0;
    const AXIS: f32 = 20.0;

    let max = points.iter().map(|(_, v)| *v).fold(0.0_f32, f32::max).max(1.0);
    let slot = WIDTH / points.len().max(1) as f32;
    let barWidth = slot * 0.6;

    let bars = points
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let height = (HEIGHT - AXIS) * value / max;
            let x = slot * i as f32 + (slot - barWidth) / 2.0;
            let y = HEIGHT - AXIS - height;
            let color = PALETTE[i % PALETTE.len()];
            view! {
                <g class="bar">
                    <rect
                        x=format!("{x}")
                        y=format!("{y}")
                        width=format!("{barWidth}")
                        height=format!("{height}")
                        fill=color
                    />
                    <text
                        x=format!("{}", x + barWidth / 2.0)
                        y=format!("{}", y - 4.0)
                        class="chart-value"
                    >
                        {format!("{value:.0}")}
                    </text>
                    <text
                        x=format!("{}", x + barWidth / 2.0)
                        y=format!("{}", HEIGHT - 4.0)
                        class="chart-label"
                    >
                        {label}
                    </text>
                </g>
            }
        })
        .collect_view();

    view! {
        <svg class="chart-svg" viewBox=format!("0 0 {WIDTH} {HEIGHT}") role="img">
            <line
                x1="0"
                y1=format!("{}", HEIGHT - AXIS)
                x2=format!("{WIDTH}")
                y2=format!("{}", HEIGHT - AXIS)
                class="chart-axis"
            />
            {bars}
        </svg>
    }
}

/// Pie chart drawn as stroked circle segments, one per slice.
#[component]
pub fn PieChart(slices: Vec<(&'static str, f32)>) -> impl IntoView {
    const SIZE: f32 = 160.0;
    const RADIUS: f32 = SIZE / 4.0;
    const CENTER: f32 = SIZE / 2.0;
    let circumference = 2.0 * std::f32::consts::PI * RADIUS;

    let total: f32 = slices.iter().map(|(_, v)| *v).sum::<f32>().max(1.0);
    let mut offset = 0.0_f32;

    let segments = slices
        .iter()
        .enumerate()
        .map(|(i, (_, value))| {
            let length = circumference * value / total;
            // Negative offsets walk clockwise from the top.
            let dashOffset = -offset;
            offset += length;
            view! {
                <circle
                    cx=format!("{CENTER}")
                    cy=format!("{CENTER}")
                    r=format!("{RADIUS}")
                    fill="none"
                    stroke=PALETTE[i % PALETTE.len()]
                    stroke-width=format!("{}", RADIUS * 2.0)
                    stroke-dasharray=format!("{length} {circumference}")
                    stroke-dashoffset=format!("{dashOffset}")
                    transform=format!("rotate(-90 {CENTER} {CENTER})")
                />
            }
        })
        .collect_view();

    let legend = slices
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let share = value / total * 100.0;
            view! {
                <li>
                    <span
                        class="legend-swatch"
                        style=format!("background: {}", PALETTE[i % PALETTE.len()])
                    ></span>
                    {format!("{label}: {value:.0} ({share:.0}%)")}
                </li>
            }
        })
        .collect_view();

    view! {
        <div class="pie-chart">
            <svg
                class="chart-svg"
                width=format!("{SIZE}")
                height=format!("{SIZE}")
                viewBox=format!("0 0 {SIZE} {SIZE}")
                role="img"
            >
                {segments}
            </svg>
            <ul class="chart-legend">{legend}</ul>
        </div>
    }
}
