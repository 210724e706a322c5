// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Candidate rendering
//!
//! Turns a candidate and a task description into a prompt template holding a
//! single [`PLACEHOLDER`] where each sample's input is substituted at
//! evaluation time. Rendering is a pure function of its inputs.

use crate::space::Candidate;
use crate::types::TaskType;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Token replaced by the sample input.
pub const PLACEHOLDER: &str = "{{text}}";

/// Language the template scaffolding is written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptLocale {
    #[default]
    English,
    Chinese,
}

/// Render a prompt template for a candidate.
///
/// Classification templates demand that only the label is returned and list
/// `labels` when given. Other task types end with the placeholder and a
/// plain instruction to produce the summary or translation.
pub fn render_template(
    task_type: TaskType,
    task_description: &str,
    candidate: &Candidate,
    labels: &[String],
    locale: PromptLocale,
) -> String {
    let mut out = String::with_capacity(256 + task_description.len());
    match locale {
        PromptLocale::English => {
            render_english(&mut out, task_type, task_description, candidate, labels)
        }
        PromptLocale::Chinese => {
            render_chinese(&mut out, task_type, task_description, candidate, labels)
        }
    }
    out
}

// write! into a String cannot fail.
fn render_english(
    out: &mut String,
    task_type: TaskType,
    task_description: &str,
    c: &Candidate,
    labels: &[String],
) {
    let _ = write!(
        out,
        "You are a {}.\n\nComplete the following task in a {} style:\n{}\n\nStrategy hint: {}\n\n",
        c.role, c.style, task_description, c.technique
    );
    match task_type {
        TaskType::Classification => {
            out.push_str(
                "**IMPORTANT: Output ONLY the classification label. Do not include any explanation, analysis or other text.**\n",
            );
            if !labels.is_empty() {
                let _ = writeln!(out, "Allowed labels: {}", labels.join(", "));
            }
            let _ = write!(out, "\nInput: {PLACEHOLDER}\nOutput (label only):");
        }
        TaskType::Summarization => {
            let _ = write!(out, "Input: {PLACEHOLDER}\n\nWrite the summary.\n");
        }
        TaskType::Translation => {
            let _ = write!(out, "Input: {PLACEHOLDER}\n\nWrite the translation.\n");
        }
    }
}

fn render_chinese(
    out: &mut String,
    task_type: TaskType,
    task_description: &str,
    c: &Candidate,
    labels: &[String],
) {
    let _ = write!(
        out,
        "你是一位{}。\n\n请以{}的风格完成以下任务：\n{}\n\n策略提示：{}\n\n",
        c.role, c.style, task_description, c.technique
    );
    match task_type {
        TaskType::Classification => {
            if labels.is_empty() {
                out.push_str("**重要：你必须只输出分类标签，不要输出任何解释、分析或其他内容。**\n");
            } else {
                let _ = writeln!(
                    out,
                    "**重要：你必须只输出分类标签（{}），不要输出任何解释、分析或其他内容。**",
                    labels.join("、")
                );
            }
            let _ = write!(out, "\n输入：{PLACEHOLDER}\n输出（只输出标签）：");
        }
        TaskType::Summarization => {
            let _ = write!(out, "输入：{PLACEHOLDER}\n\n请输出摘要。\n");
        }
        TaskType::Translation => {
            let _ = write!(out, "输入：{PLACEHOLDER}\n\n请输出译文。\n");
        }
    }
}

/// Substitute a sample input for the placeholder.
pub fn fill_template(template: &str, input: &str) -> String {
    template.replace(PLACEHOLDER, input)
}
