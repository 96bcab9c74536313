use web_sys::CanvasRenderingContext2d;

use super::state::GraphViewState;

const BACKGROUND: &str = "#ffffff";
const STROKE_OPACITY: f64 = 0.6;
const HOVER_OPACITY: f64 = 0.9;

pub fn render(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_links(state, ctx);
	ctx.restore();
}

fn draw_links(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	ctx.set_line_cap("butt");
	for line in &state.scene.lines {
		let alpha = if state.hover == Some(line.link) {
			HOVER_OPACITY
		} else {
			STROKE_OPACITY
		};
		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(&line.color);
		ctx.set_line_width(line.width);
		ctx.begin_path();
		ctx.move_to(line.x1, line.y1);
		ctx.line_to(line.x2, line.y2);
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);
}
