//! Helper scripts installed into the namespace.
//!
//! Both scripts take the namespace directory as their first positional
//! argument and communicate only through files inside it.

pub const CONSOLE_SCRIPT_NAME: &str = "openConsole.sh";
pub const PICKER_SCRIPT_NAME: &str = "openFile.sh";

/// Console helper: `openConsole.sh <namespace> <font size> <background> <foreground>`.
///
/// Tails `console.ansi` in an xterm and refreshes `console.heartbeat` with the
/// epoch milliseconds until `console.exit` appears or the terminal closes.
pub const CONSOLE_SCRIPT: &str = r#"#!/bin/bash

NAMESPACE="$1"
FONT_SIZE="${2:-10}"
BACKGROUND="${3:-#000000}"
FOREGROUND="${4:-#ffffff}"

LOG_FILE="$NAMESPACE/console.ansi"
HEARTBEAT_FILE="$NAMESPACE/console.heartbeat"
EXIT_FILE="$NAMESPACE/console.exit"

xterm \
  -fa Monospace \
  -bg "$BACKGROUND" -fg "$FOREGROUND" \
  -T "Console" \
  -fs "$FONT_SIZE" \
  -xrm "XTerm*VT100.Translations: #override Ctrl Shift <Key>C: copy-selection(CLIPBOARD)" \
  -e tail -F "$LOG_FILE" &

TERM_PID=$!

while [ ! -f "$EXIT_FILE" ]; do
    if ! kill -0 "$TERM_PID" 2>/dev/null; then
        break
    fi

    date +%s%3N > "$HEARTBEAT_FILE"
    sleep 0.016667
done

kill "$TERM_PID" 2>/dev/null
rm -f "$EXIT_FILE"
"#;

/// Picker helper:
/// `openFile.sh <namespace> <start path> <title> <mode> [filter...]`.
///
/// Truncates `selectedFile.txt`, shows the desktop's file dialog and writes
/// the chosen path(s) one per line, or `-1` when the dialog was dismissed.
pub const PICKER_SCRIPT: &str = r#"#!/bin/bash

export GTK_USE_PORTAL=1

NAMESPACE="$1"
shift

TMP="$NAMESPACE/selectedFile.txt"

> "$TMP"

START_PATH="$1"
shift
[ -z "$START_PATH" ] && START_PATH="$HOME"
[ -f "$START_PATH" ] && START_PATH="$(dirname "$START_PATH")"

TITLE="$1"
shift
[ -z "$TITLE" ] && TITLE="Select a file"

MODE="$1"
shift
[ -z "$MODE" ] && MODE="single"

FILTERS=("$@")

PICKER=""
DE="$XDG_CURRENT_DESKTOP"
if [[ "$DE" == *KDE* ]]; then
    PICKER="kdialog"
elif [[ "$DE" == *GNOME* ]]; then
    PICKER="zenity"
fi

if ! command -v "$PICKER" >/dev/null 2>&1; then
    if command -v kdialog >/dev/null 2>&1; then
        PICKER="kdialog"
    elif command -v zenity >/dev/null 2>&1; then
        PICKER="zenity"
    elif command -v yad >/dev/null 2>&1; then
        PICKER="yad"
    else
        PICKER="xdg-open"
    fi
fi

DEFAULT_FILE=""
if [ "$MODE" = "save" ] && [ "${#FILTERS[@]}" -gt 0 ]; then
    IFS='|' read -r desc exts <<< "${FILTERS[0]}"
    FIRST_EXT=$(echo "$exts" | awk '{print $1}')
    FIRST_EXT="${FIRST_EXT#\*}"
    DEFAULT_FILE="Untitled$FIRST_EXT"
fi

gtk_style() {
    CMD=("$1" --title="$TITLE" --filename="$START_PATH/$DEFAULT_FILE")
    case "$MODE" in
        multi) CMD+=(--file-selection --multiple --separator=":") ;;
        dir) CMD+=(--file-selection --directory) ;;
        save) CMD+=(--file-selection --save) ;;
        *) CMD+=(--file-selection) ;;
    esac
    for f in "${FILTERS[@]}"; do
        IFS='|' read -r desc exts <<< "$f"
        CMD+=(--file-filter="$desc | $exts")
    done
    FILE=$("${CMD[@]}")
    STATUS=$?
}

launch_picker() {
    FILE=""
    STATUS=0

    if [ "$MODE" = "browse" ] || [ "$PICKER" = "xdg-open" ]; then
        xdg-open "$START_PATH"
        return
    fi

    case "$PICKER" in
        zenity|yad)
            gtk_style "$PICKER"
            ;;
        kdialog)
            FILTER_STRING=""
            for f in "${FILTERS[@]}"; do
                IFS='|' read -r desc exts <<< "$f"
                [[ -n "$FILTER_STRING" ]] && FILTER_STRING+=" | "
                FILTER_STRING+="$exts | $desc"
            done
            case "$MODE" in
                multi) FILE=$(kdialog --title "$TITLE" --getopenfilenames "$START_PATH" "$FILTER_STRING") ;;
                dir) FILE=$(kdialog --title "$TITLE" --getexistingdirectory "$START_PATH") ;;
                save) FILE=$(kdialog --title "$TITLE" --getsavefilename "$START_PATH/$DEFAULT_FILE" "$FILTER_STRING") ;;
                *) FILE=$(kdialog --title "$TITLE" --getopenfilename "$START_PATH" "$FILTER_STRING") ;;
            esac
            STATUS=$?
            ;;
    esac

    if [ -n "$FILE" ]; then
        if [ "$MODE" = "multi" ]; then
            case "$PICKER" in
                kdialog) echo "$FILE" | sed 's/"//g' | tr ' ' '\n' > "$TMP" ;;
                *) echo "$FILE" | tr ':' '\n' > "$TMP" ;;
            esac
        else
            echo "$FILE" > "$TMP"
        fi
    else
        [ "$STATUS" -ne 0 ] && echo "-1" > "$TMP"
    fi
}

launch_picker &
"#;
