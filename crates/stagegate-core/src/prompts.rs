//! Instruction texts injected by the detectors.
//!
//! Consumers match on this text, so it is reproduced byte-for-byte and carries
//! no branching.

/// Injected when every tracked task is completed (stage 1 → 2).
pub const RUN_DIAGNOSTICS: &str = r#"All tasks from the todo list have been completed!

According to the CLAUDE.md workflow, you must now execute the "After All Tasks Completed" section:

1. **Run project-wide diagnostics**: Use mcp__vscode-mcp__get_diagnostics with workspace path
2. **Fix all diagnostic issues**: Address ERROR (severity 0), WARNING (severity 1), and INFO/HINT (severity 2-3)
3. **Invoke code-reviewer**: Launch code-reviewer sub-agent for consolidated review of ALL changes
   - Provide complete list of modified files
   - Specify all modified functions/classes
   - Describe overall scope of changes
   - Instruct to skip diagnostics (already performed)
4. **Generate final summary report**: Create comprehensive report with implementation details and review findings

Proceed with these steps now."#;

/// Injected when project diagnostics come back clean (stage 2 → 3).
pub const INVOKE_REVIEWER: &str = r#"Project-wide diagnostics are clean! All issues have been resolved.

According to the CLAUDE.md workflow, you must now invoke the code-reviewer sub-agent:

**Pre-Review Preparation**:

Before invoking code-reviewer, consolidate information from all completed tasks:

1. **Aggregate Modified Files**: Collect all files created/modified across ALL tasks
2. **Aggregate Modified Components**: List all functions, classes, methods changed
3. **Summarize Scope**: Overall description of what was implemented
4. **Context Collection**: Important decisions or trade-offs made

**Invoking code-reviewer**:

Call the Task tool with subagent_type="code-reviewer" and provide:
- Complete file list: All files created/modified during task execution
- Complete component list: All functions, classes, code blocks changed
- Consolidated scope: Overall description of implementation
- Cross-task context: How different tasks relate to each other, dependencies
- **Skip diagnostics**: Instruct code-reviewer to NOT run diagnostic tools (already performed)

Proceed with code review now. The final report will be generated automatically after review completes."#;

/// Injected once the reviewer sub-agent has been invoked (stage 3 → 4).
pub const FINAL_REPORT: &str = r#"Code review has been completed!

According to the CLAUDE.md workflow, you must now generate the Final Summary Report.

**Report Requirements** (800-1200 tokens):

Generate a comprehensive report that aggregates:
- Summary of all completed tasks from todo list
- Aggregated list of all files created/modified
- Consolidated implementation details
- Comprehensive review results from code-reviewer (what was found, recommendations)
- Overall status and recommendations

**Report Structure**:

Follow the template from CLAUDE.md (lines 137-224):

```markdown
# Отчёт о результатах реализации

## Детали реализации

### Изменённые/созданные файлы
- [file.ext](path) - Description

### Применённые паттерны проектирования
- **Pattern Name**: Where and why used

### Ключевые решения при реализации
- Decision 1
- Decision 2

---

## Результаты проверки кода

### Итого
- **Критических**: X (must fix before merge)
- **Высокий приоритет**: Y (fix before deployment)
- **Рекомендации**: Z improvements

### Критические проблемы
1. [Issue name]
   Detailed explanation...
   Затронутые файлы:
   - file.ext:line

### Высокий приоритет
1. [Issue name]
   Explanation...

### Рекомендации
1. [Improvement suggestion]
   Why and how...

### Положительные наблюдения
- ✅ Good practice 1
- ✅ Good practice 2

---

## Следующие шаги
- What to do next
- Deployment considerations

---

## Общая оценка

2-3 sentence summary of code quality, readiness for use, and important warnings.
```

**Report Format**:
- Use Russian language for the report
- Include file references as markdown links with line numbers
- Provide clear status indicator:
  - ✅ **Ready for Use**: No critical/high issues, implementation complete
  - ⚠️ **Requires Fixes**: High-priority issues found, fix before deployment
  - ❌ **Critical Issues Found**: Security/critical errors, must fix urgently
- Focus on actionable information and clear priorities
- Include function signatures for implemented code

Generate the final summary report now."#;

/// Annotation text accompanying [`RUN_DIAGNOSTICS`].
pub fn completion_context(completed: usize) -> String {
    format!("Todo list completion detected: {completed} tasks all marked as completed.")
}
